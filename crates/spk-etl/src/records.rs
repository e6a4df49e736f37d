//! Raw input records and the field subsets each table needs.
//!
//! Every table's row is deserialized from the same JSON value on its own,
//! so a bad field only fails the rows that actually use it.

use crate::error::{EtlError, EtlResult};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Page value that marks a song-play event.
pub(crate) const NEXT_SONG_PAGE: &str = "NextSong";

/// One parsed line of a data file, with its 1-based line number.
#[derive(Debug)]
pub(crate) struct RawRecord {
    pub line: usize,
    pub value: Value,
}

impl RawRecord {
    /// Deserialize the subset of fields `T` needs for `table`.
    pub fn fields<T: DeserializeOwned>(&self, table: &'static str) -> EtlResult<T> {
        T::deserialize(&self.value).map_err(|source| EtlError::InvalidRecord {
            table,
            line: self.line,
            source,
        })
    }

    /// Whether this event is a song play.
    pub fn is_song_play(&self) -> bool {
        self.value.get("page").and_then(Value::as_str) == Some(NEXT_SONG_PAGE)
    }
}

/// Read a newline-delimited JSON file.
///
/// The outer error is a file-level read failure; each inner result is one
/// non-blank line. Blank lines are ignored.
pub(crate) fn read_json_lines(path: &Path) -> EtlResult<Vec<EtlResult<RawRecord>>> {
    let content = std::fs::read_to_string(path).map_err(|e| EtlError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(parse_json_lines(&content))
}

pub(crate) fn parse_json_lines(content: &str) -> Vec<EtlResult<RawRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(idx, text)| {
            let line = idx + 1;
            serde_json::from_str(text)
                .map(|value| RawRecord { line, value })
                .map_err(|source| EtlError::InvalidJson { line, source })
        })
        .collect()
}

// ── Song catalog ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct SongFields {
    pub song_id: String,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<i32>,
    pub duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistFields {
    pub artist_id: String,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

// ── Event log ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct TimeFields {
    pub ts: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserFields {
    #[serde(deserialize_with = "lenient_int")]
    pub user_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SongplayFields {
    pub ts: i64,
    #[serde(deserialize_with = "lenient_int")]
    pub user_id: i32,
    pub level: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub length: Option<f64>,
    #[serde(deserialize_with = "lenient_int")]
    pub session_id: i32,
    #[serde(deserialize_with = "lenient_int")]
    pub item_in_session: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

/// Accept an integer given either as a JSON number or a numeric string,
/// and check it fits the target column type.
///
/// Event logs carry `userId` as a string (`""` for logged-out users).
fn lenient_int<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let n = match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => n,
        IntOrString::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected an integer, found {:?}", s)))?,
    };
    T::try_from(n).map_err(|_| D::Error::custom(format!("integer {} is out of range", n)))
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
