//! Parameterized statements run by the load pipeline.
//!
//! Dimension inserts are conflict-skipping so that replaying a file leaves
//! row counts unchanged. `time` has no key and is never deduplicated.

use spk_core::UserConflictPolicy;

/// Insert one song; no-op when `song_id` already exists.
pub const SONG_INSERT: &str = "INSERT INTO songs (song_id, title, artist_id, year, duration)
     VALUES (?, ?, ?, ?, ?)
     ON CONFLICT DO NOTHING";

/// Insert one artist; no-op when `artist_id` already exists.
pub const ARTIST_INSERT: &str =
    "INSERT INTO artists (artist_id, name, location, latitude, longitude)
     VALUES (?, ?, ?, ?, ?)
     ON CONFLICT DO NOTHING";

/// Insert one time row.
pub const TIME_INSERT: &str =
    "INSERT INTO \"time\" (start_time, hour, day, week, month, year, weekday)
     VALUES (?, ?, ?, ?, ?, ?, ?)";

/// Insert one user; the first-seen row wins.
pub const USER_INSERT_SKIP: &str =
    "INSERT INTO users (user_id, first_name, last_name, gender, level)
     VALUES (?, ?, ?, ?, ?)
     ON CONFLICT DO NOTHING";

/// Insert one user; the latest-seen row wins.
pub const USER_INSERT_UPDATE: &str =
    "INSERT INTO users (user_id, first_name, last_name, gender, level)
     VALUES (?, ?, ?, ?, ?)
     ON CONFLICT (user_id) DO UPDATE SET
         first_name = excluded.first_name,
         last_name = excluded.last_name,
         gender = excluded.gender,
         level = excluded.level";

/// Insert one songplay; no-op when `songplay_id` already exists.
pub const SONGPLAY_INSERT: &str = "INSERT INTO songplays (
         songplay_id, start_time, user_id, level, song_id,
         artist_id, session_id, location, user_agent
     )
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
     ON CONFLICT DO NOTHING";

/// Resolve `(song_id, artist_id)` for a play event by title, artist name,
/// and duration. Ties go to the lowest `song_id`.
pub const SONG_SELECT: &str = "SELECT s.song_id, a.artist_id
     FROM songs s
     LEFT JOIN artists a ON a.artist_id = s.artist_id
     WHERE s.title = ? AND a.name = ? AND s.duration = ?
     ORDER BY s.song_id
     LIMIT 1";

/// User insert statement for the configured conflict policy.
pub fn user_insert(policy: UserConflictPolicy) -> &'static str {
    match policy {
        UserConflictPolicy::Skip => USER_INSERT_SKIP,
        UserConflictPolicy::Update => USER_INSERT_UPDATE,
    }
}
