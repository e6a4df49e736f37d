//! Event-log transformer.
//!
//! Song-play events (`page == "NextSong"`) become `time`, `users`, and
//! `songplays` rows. Each table is loaded in its own pass over the events and
//! every row succeeds or fails on its own.

use crate::error::{EtlError, EtlResult};
use crate::records::{read_json_lines, RawRecord, SongplayFields, TimeFields, UserFields};
use crate::report::FileReport;
use crate::time_dim::TimeRow;
use spk_core::{songplay_fingerprint, UserConflictPolicy};
use spk_db::queries::{user_insert, SONGPLAY_INSERT, SONG_SELECT};
use spk_db::{params, DbResult, Warehouse};
use std::collections::HashMap;
use std::path::Path;

/// One row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

impl UserRow {
    fn from_record(record: &RawRecord) -> EtlResult<Self> {
        let fields: UserFields = record.fields("users")?;
        let gender = fields.gender.filter(|g| !g.is_empty());
        if let Some(gender) = &gender {
            if gender.chars().count() != 1 {
                return Err(EtlError::InvalidField {
                    field: "gender",
                    line: record.line,
                    message: format!("expected a single character, found {:?}", gender),
                });
            }
        }
        Ok(Self {
            user_id: fields.user_id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            gender,
            level: fields.level,
        })
    }

    fn insert(&self, warehouse: &Warehouse, policy: UserConflictPolicy) -> DbResult<usize> {
        warehouse.execute(
            user_insert(policy),
            params![
                self.user_id,
                self.first_name,
                self.last_name,
                self.gender,
                self.level
            ],
        )
    }
}

/// Song and artist keys resolved for a play event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongMatch {
    pub song_id: String,
    pub artist_id: Option<String>,
}

/// One row of the `songplays` fact table.
#[derive(Debug, Clone, PartialEq)]
pub struct SongplayRow {
    pub songplay_id: String,
    pub start_time: i64,
    pub user_id: i32,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i32,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl SongplayRow {
    fn new(fields: SongplayFields, matched: Option<SongMatch>) -> Self {
        let (song_id, artist_id) = match matched {
            Some(m) => (Some(m.song_id), m.artist_id),
            None => (None, None),
        };
        Self {
            songplay_id: songplay_fingerprint(
                fields.ts,
                i64::from(fields.user_id),
                i64::from(fields.session_id),
                fields.item_in_session,
            ),
            start_time: fields.ts,
            user_id: fields.user_id,
            level: fields.level,
            song_id,
            artist_id,
            session_id: fields.session_id,
            location: fields.location,
            user_agent: fields.user_agent,
        }
    }

    fn insert(&self, warehouse: &Warehouse) -> DbResult<usize> {
        warehouse.execute(
            SONGPLAY_INSERT,
            params![
                self.songplay_id,
                self.start_time,
                self.user_id,
                self.level,
                self.song_id,
                self.artist_id,
                self.session_id,
                self.location,
                self.user_agent
            ],
        )
    }
}

/// Find the catalog song a play event refers to.
///
/// Title, artist name, and duration must all match exactly. Events missing
/// any of the three never match.
pub fn lookup_song(
    warehouse: &Warehouse,
    title: Option<&str>,
    artist: Option<&str>,
    length: Option<f64>,
) -> DbResult<Option<SongMatch>> {
    let (Some(title), Some(artist), Some(length)) = (title, artist, length) else {
        return Ok(None);
    };
    warehouse.fetch_one(SONG_SELECT, params![title, artist, length], |row| {
        Ok(SongMatch {
            song_id: row.get(0)?,
            artist_id: row.get(1)?,
        })
    })
}

/// Load one event-log file into `time`, `users`, and `songplays`.
///
/// Only an unreadable file is returned as an error; bad lines and bad rows
/// are recorded in `report`.
pub fn process_log_file(
    warehouse: &Warehouse,
    path: &Path,
    user_conflict: UserConflictPolicy,
    report: &mut FileReport,
) -> EtlResult<()> {
    let mut plays = Vec::new();
    for parsed in read_json_lines(path)? {
        match parsed {
            Ok(record) if record.is_song_play() => plays.push(record),
            Ok(_) => report.filtered += 1,
            Err(e) => report.record_error(&e),
        }
    }
    log::debug!(
        "{}: {} song plays, {} other events",
        path.display(),
        plays.len(),
        report.filtered
    );

    load_time(warehouse, &plays, report);
    load_users(warehouse, &plays, user_conflict, report);
    load_songplays(warehouse, &plays, report);
    Ok(())
}

fn load_time(warehouse: &Warehouse, plays: &[RawRecord], report: &mut FileReport) {
    for record in plays {
        let row = record
            .fields::<TimeFields>("time")
            .and_then(|f| TimeRow::parse(f.ts, record.line));
        match row {
            Ok(row) => report.record_insert("time", record.line, row.insert(warehouse)),
            Err(e) => report.record_error(&e),
        }
    }
}

/// Users are collapsed to one row per `user_id` before insert: the first
/// event under `Skip`, the last under `Update`. The database conflict clause
/// applies the same policy against rows from earlier files.
fn load_users(
    warehouse: &Warehouse,
    plays: &[RawRecord],
    policy: UserConflictPolicy,
    report: &mut FileReport,
) {
    let mut users: Vec<(usize, UserRow)> = Vec::new();
    let mut index: HashMap<i32, usize> = HashMap::new();

    for record in plays {
        let user = match UserRow::from_record(record) {
            Ok(user) => user,
            Err(e) => {
                report.record_error(&e);
                continue;
            }
        };
        match index.get(&user.user_id) {
            Some(&pos) => {
                if policy == UserConflictPolicy::Update {
                    users[pos] = (record.line, user);
                }
                report.skipped += 1;
            }
            None => {
                index.insert(user.user_id, users.len());
                users.push((record.line, user));
            }
        }
    }

    for (line, user) in &users {
        report.record_insert("users", *line, user.insert(warehouse, policy));
    }
}

fn load_songplays(warehouse: &Warehouse, plays: &[RawRecord], report: &mut FileReport) {
    for record in plays {
        let fields: SongplayFields = match record.fields("songplays") {
            Ok(fields) => fields,
            Err(e) => {
                report.record_error(&e);
                continue;
            }
        };

        let matched = match lookup_song(
            warehouse,
            fields.song.as_deref(),
            fields.artist.as_deref(),
            fields.length,
        ) {
            Ok(matched) => matched,
            Err(source) => {
                report.record_error(&EtlError::Lookup {
                    line: record.line,
                    source,
                });
                continue;
            }
        };
        if matched.is_none() {
            report.unmatched += 1;
        }

        let row = SongplayRow::new(fields, matched);
        report.record_insert("songplays", record.line, row.insert(warehouse));
    }
}

#[cfg(test)]
#[path = "log_file_test.rs"]
mod tests;
