use super::*;
use crate::cli::EtlTarget;
use crate::commands::create_tables;
use spk_db::{Warehouse, TABLES};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const SONG: &str = r#"{"num_songs": 1, "artist_id": "A1", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "Art", "song_id": "S1", "title": "X", "duration": 200.0, "year": 2000}"#;

const PLAY: &str = r#"{"artist": "Art", "auth": "Logged In", "firstName": "Walter", "gender": "M", "itemInSession": 0, "lastName": "Frye", "length": 200.0, "level": "free", "location": "San Francisco-Oakland-Hayward, CA", "method": "PUT", "page": "NextSong", "registration": 1540919166796.0, "sessionId": 38, "song": "X", "status": 200, "ts": 1541207953796, "userAgent": "Mozilla/5.0", "userId": "39"}"#;

const HOME: &str = r#"{"artist": null, "auth": "Logged In", "firstName": "Walter", "gender": "M", "itemInSession": 1, "lastName": "Frye", "length": null, "level": "free", "location": "San Francisco-Oakland-Hayward, CA", "method": "GET", "page": "Home", "registration": 1540919166796.0, "sessionId": 38, "song": null, "status": 200, "ts": 1541207960000, "userAgent": "Mozilla/5.0", "userId": "39"}"#;

/// Project with a config file, one song file, and one log file.
fn project() -> TempDir {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::write(
        root.join("sparkify.yml"),
        "database:\n  path: warehouse.duckdb\ndata:\n  song_path: data/songs\n  log_path: data/logs\n",
    )
    .unwrap();
    write(root, "data/songs/A/TRAAA.json", SONG);
    write(root, "data/logs/2018/11/2018-11-03-events.json", &format!("{PLAY}\n{HOME}\n"));
    temp_dir
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn global(project_dir: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        quiet: true,
        project_dir: project_dir.to_path_buf(),
        config: None,
        database: None,
    }
}

fn counts(project_dir: &Path) -> Vec<(&'static str, i64)> {
    let warehouse = Warehouse::open_path(&project_dir.join("warehouse.duckdb")).unwrap();
    TABLES
        .iter()
        .map(|t| (t.name, warehouse.count_rows(t).unwrap()))
        .collect()
}

fn resolved_songplay(project_dir: &Path) -> Option<(Option<String>, Option<String>)> {
    let warehouse = Warehouse::open_path(&project_dir.join("warehouse.duckdb")).unwrap();
    warehouse
        .fetch_one("SELECT song_id, artist_id FROM songplays", &[], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap()
}

#[test]
fn test_full_load() {
    let temp_dir = project();
    let global = global(temp_dir.path());
    create_tables::execute(&global).unwrap();

    execute(&EtlArgs::default(), &global).unwrap();

    assert_eq!(
        counts(temp_dir.path()),
        vec![
            ("songplays", 1),
            ("users", 1),
            ("songs", 1),
            ("artists", 1),
            ("time", 1)
        ]
    );
    assert_eq!(
        resolved_songplay(temp_dir.path()),
        Some((Some("S1".to_string()), Some("A1".to_string())))
    );
}

#[test]
fn test_second_run_keeps_dimensions_and_facts() {
    let temp_dir = project();
    let global = global(temp_dir.path());
    create_tables::execute(&global).unwrap();

    execute(&EtlArgs::default(), &global).unwrap();
    execute(&EtlArgs::default(), &global).unwrap();

    let counts = counts(temp_dir.path());
    assert!(counts.contains(&("songplays", 1)));
    assert!(counts.contains(&("songs", 1)));
    assert!(counts.contains(&("artists", 1)));
    assert!(counts.contains(&("users", 1)));
    // time rows have no key and are appended on every run
    assert!(counts.contains(&("time", 2)));
}

#[test]
fn test_only_logs_leaves_songplay_unresolved() {
    let temp_dir = project();
    let global = global(temp_dir.path());
    create_tables::execute(&global).unwrap();

    let args = EtlArgs {
        only: Some(EtlTarget::Logs),
        ..EtlArgs::default()
    };
    execute(&args, &global).unwrap();

    assert!(counts(temp_dir.path()).contains(&("songs", 0)));
    assert_eq!(resolved_songplay(temp_dir.path()), Some((None, None)));
}

#[test]
fn test_path_overrides() {
    let temp_dir = project();
    let other = tempdir().unwrap();
    write(other.path(), "nested/TRBBB.json", &SONG.replace("S1", "S2"));
    let global = global(temp_dir.path());
    create_tables::execute(&global).unwrap();

    let args = EtlArgs {
        song_path: Some(other.path().to_path_buf()),
        only: Some(EtlTarget::Songs),
        ..EtlArgs::default()
    };
    execute(&args, &global).unwrap();

    let warehouse = Warehouse::open_path(&temp_dir.path().join("warehouse.duckdb")).unwrap();
    let song_id: Option<String> = warehouse
        .fetch_one("SELECT song_id FROM songs", &[], |row| row.get(0))
        .unwrap();
    assert_eq!(song_id.as_deref(), Some("S2"));
}

#[test]
fn test_bad_file_only_fails_with_flag() {
    let temp_dir = project();
    write(temp_dir.path(), "data/songs/B/TRBAD.json", "{not json");
    let global = global(temp_dir.path());
    create_tables::execute(&global).unwrap();

    let args = EtlArgs {
        only: Some(EtlTarget::Songs),
        ..EtlArgs::default()
    };
    execute(&args, &global).unwrap();

    let args = EtlArgs {
        fail_on_error: true,
        ..args
    };
    let err = execute(&args, &global).unwrap_err();
    assert_eq!(err.downcast_ref::<ExitCode>().map(|c| c.0), Some(EXIT_LOAD_ERRORS));
    assert!(counts(temp_dir.path()).contains(&("songs", 1)));
}

#[test]
fn test_requires_tables() {
    let temp_dir = project();
    let err = execute(&EtlArgs::default(), &global(temp_dir.path())).unwrap_err();
    assert!(err.to_string().contains("create-tables"));
}

#[test]
fn test_missing_data_root_is_error() {
    let temp_dir = project();
    fs::remove_dir_all(temp_dir.path().join("data/logs")).unwrap();
    let global = global(temp_dir.path());
    create_tables::execute(&global).unwrap();

    let err = execute(&EtlArgs::default(), &global).unwrap_err();
    assert!(err.to_string().contains("Failed to discover logs files"));
    // songs were loaded before the log pass failed
    assert!(counts(temp_dir.path()).contains(&("songs", 1)));
}
