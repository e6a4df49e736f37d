use super::*;
use spk_db::TABLES;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, Warehouse) {
    let dir = tempfile::tempdir().unwrap();
    let wh = Warehouse::open_memory().unwrap();
    assert!(wh.create_tables().is_success());
    (dir, wh)
}

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn song(song_id: &str, artist_id: &str) -> String {
    format!(
        r#"{{"song_id": "{song_id}", "title": "T {song_id}", "artist_id": "{artist_id}", "year": 0, "duration": 100.5, "artist_name": "N {artist_id}", "artist_location": null, "artist_latitude": 1.5, "artist_longitude": -2.5}}"#
    )
}

fn play(user_id: &str, level: &str, item: i64) -> String {
    format!(
        r#"{{"artist": "Art", "firstName": "Lily", "gender": "F", "itemInSession": {item}, "lastName": "Koch", "length": 200.0, "level": "{level}", "location": "Chicago", "page": "NextSong", "sessionId": 818, "song": "X", "ts": 1541207953796, "userAgent": "Mozilla/5.0", "userId": "{user_id}"}}"#
    )
}

fn count(wh: &Warehouse, name: &str) -> i64 {
    wh.count_rows(TABLES.iter().find(|t| t.name == name).unwrap())
        .unwrap()
}

#[test]
fn test_data_kind_display() {
    assert_eq!(DataKind::Songs.to_string(), "songs");
    assert_eq!(DataKind::Logs.to_string(), "logs");
}

#[test]
fn test_run_reports_progress_in_path_order() {
    let (dir, wh) = setup();
    write(dir.path(), "B/TRB.json", &song("S2", "A2"));
    write(dir.path(), "A/TRA.json", &song("S1", "A1"));

    let pipeline = Pipeline::new(&wh, &Config::default());
    let mut seen = Vec::new();
    let run = pipeline
        .run(DataKind::Songs, dir.path(), |p| {
            seen.push((p.index, p.total, p.report.path.clone()));
        })
        .unwrap();

    assert_eq!(run.files_processed(), 2);
    assert!(run.is_clean());
    assert_eq!(seen[0].0, 1);
    assert_eq!(seen[1].1, 2);
    assert!(seen[0].2.ends_with("A/TRA.json"));
    assert!(seen[1].2.ends_with("B/TRB.json"));
    assert_eq!(count(&wh, "songs"), 2);
    assert_eq!(count(&wh, "artists"), 2);
}

#[test]
fn test_bad_file_does_not_stop_run() {
    let (dir, wh) = setup();
    write(dir.path(), "a.json", "");
    write(dir.path(), "b.json", "{broken");
    write(dir.path(), "c.json", &song("S1", "A1"));

    let pipeline = Pipeline::new(&wh, &Config::default());
    let run = pipeline.run(DataKind::Songs, dir.path(), |_| {}).unwrap();

    assert_eq!(run.files_processed(), 3);
    assert_eq!(run.files_with_errors(), 2);
    assert!(run.files.iter().all(|f| f.committed));
    assert_eq!(count(&wh, "songs"), 1);
    assert!(!wh.in_transaction());
}

#[test]
fn test_missing_root_is_error() {
    let (dir, wh) = setup();
    let pipeline = Pipeline::new(&wh, &Config::default());
    let err = pipeline
        .run(DataKind::Logs, &dir.path().join("missing"), |_| {})
        .unwrap_err();
    assert!(matches!(err, EtlError::Discovery(_)));
}

#[test]
fn test_extension_from_config() {
    let (dir, wh) = setup();
    write(dir.path(), "a.json", &song("S1", "A1"));
    write(dir.path(), "b.jsonl", &song("S2", "A2"));

    let mut config = Config::default();
    config.data.extension = "jsonl".to_string();
    let pipeline = Pipeline::new(&wh, &config);
    let files = pipeline.discover(dir.path()).unwrap();

    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("b.jsonl"));
}

#[test]
fn test_file_fails_when_transaction_already_open() {
    let (dir, wh) = setup();
    let path = write(dir.path(), "a.json", &song("S1", "A1"));
    wh.begin().unwrap();

    let pipeline = Pipeline::new(&wh, &Config::default());
    let report = pipeline.process_file(DataKind::Songs, &path);

    assert!(!report.committed);
    assert_eq!(report.failed, 1);
    assert!(report.errors[0].contains("L009"));
    wh.rollback().unwrap();
}

#[test]
fn test_max_errors_per_file_from_config() {
    let (dir, wh) = setup();
    let path = write(dir.path(), "events.json", "{a\n{b\n{c\n");

    let mut config = Config::default();
    config.etl.max_errors_per_file = 1;
    let pipeline = Pipeline::new(&wh, &config);
    let report = pipeline.process_file(DataKind::Logs, &path);

    assert_eq!(report.failed, 3);
    assert_eq!(report.errors.len(), 1);
    assert!(report.committed);
}

#[test]
fn test_database_row_error_rolls_back_file() {
    let (dir, wh) = setup();
    wh.execute("DROP TABLE users", &[]).unwrap();
    wh.execute(
        "CREATE TABLE users (user_id INTEGER PRIMARY KEY, first_name VARCHAR,
         last_name VARCHAR, gender VARCHAR,
         level VARCHAR CHECK (level IN ('free', 'paid')))",
        &[],
    )
    .unwrap();
    write(
        dir.path(),
        "a/events.json",
        &format!("{}\n{}", play("39", "free", 0), play("40", "gold", 1)),
    );
    write(dir.path(), "b/events.json", &play("41", "paid", 2));

    let pipeline = Pipeline::new(&wh, &Config::default());
    let run = pipeline.run(DataKind::Logs, dir.path(), |_| {}).unwrap();

    let aborted = &run.files[0];
    assert!(aborted.transaction_aborted());
    assert!(!aborted.committed);
    assert_eq!(aborted.inserted, 0);
    assert!(aborted.errors[0].contains("L006"));
    assert!(aborted.errors.iter().any(|e| e.contains("rolled back")));
    assert!(run.files[1].is_clean());
    assert_eq!(run.files_with_errors(), 1);

    // only the second file persisted
    assert_eq!(count(&wh, "time"), 1);
    assert_eq!(count(&wh, "users"), 1);
    assert_eq!(count(&wh, "songplays"), 1);
    assert!(!wh.in_transaction());
}

#[test]
fn test_validation_failure_keeps_good_rows() {
    let (dir, wh) = setup();
    let path = write(
        dir.path(),
        "events.json",
        &format!("{}\n{}", play("39", "free", 0), play("3000000000", "free", 1)),
    );

    let pipeline = Pipeline::new(&wh, &Config::default());
    let report = pipeline.process_file(DataKind::Logs, &path);

    assert!(report.committed);
    assert!(!report.transaction_aborted());
    assert_eq!(report.failed, 2);
    assert_eq!(count(&wh, "time"), 2);
    assert_eq!(count(&wh, "users"), 1);
    assert_eq!(count(&wh, "songplays"), 1);
}
