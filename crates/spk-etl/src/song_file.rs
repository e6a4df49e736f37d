//! Song-catalog transformer: one record becomes a song row and an artist row.

use crate::error::{EtlError, EtlResult};
use crate::records::{read_json_lines, ArtistFields, RawRecord, SongFields};
use crate::report::FileReport;
use spk_db::queries::{ARTIST_INSERT, SONG_INSERT};
use spk_db::{params, DbResult, Warehouse};
use std::path::Path;

/// One row of the `songs` table.
#[derive(Debug, Clone, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<i32>,
    pub duration: Option<f64>,
}

impl SongRow {
    fn from_record(record: &RawRecord) -> EtlResult<Self> {
        let fields: SongFields = record.fields("songs")?;
        Ok(Self {
            song_id: fields.song_id,
            title: fields.title,
            artist_id: fields.artist_id,
            year: fields.year,
            duration: fields.duration,
        })
    }

    fn insert(&self, warehouse: &Warehouse) -> DbResult<usize> {
        warehouse.execute(
            SONG_INSERT,
            params![
                self.song_id,
                self.title,
                self.artist_id,
                self.year,
                self.duration
            ],
        )
    }
}

/// One row of the `artists` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ArtistRow {
    fn from_record(record: &RawRecord) -> EtlResult<Self> {
        let fields: ArtistFields = record.fields("artists")?;
        Ok(Self {
            artist_id: fields.artist_id,
            name: fields.artist_name,
            location: fields.artist_location,
            latitude: fields.artist_latitude,
            longitude: fields.artist_longitude,
        })
    }

    fn insert(&self, warehouse: &Warehouse) -> DbResult<usize> {
        warehouse.execute(
            ARTIST_INSERT,
            params![
                self.artist_id,
                self.name,
                self.location,
                self.latitude,
                self.longitude
            ],
        )
    }
}

/// Load the first record of a catalog file into `songs` and `artists`.
///
/// The song and the artist are extracted and inserted independently; a
/// failure of one is recorded in `report` and the other is still attempted.
/// Only an unreadable or empty file is returned as an error.
pub fn process_song_file(
    warehouse: &Warehouse,
    path: &Path,
    report: &mut FileReport,
) -> EtlResult<()> {
    let mut records = read_json_lines(path)?.into_iter();
    let record = records.next().ok_or(EtlError::EmptyFile)??;
    if records.next().is_some() {
        log::debug!(
            "{} holds more than one record; only the first is loaded",
            path.display()
        );
    }

    match SongRow::from_record(&record) {
        Ok(song) => report.record_insert("songs", record.line, song.insert(warehouse)),
        Err(e) => report.record_error(&e),
    }

    match ArtistRow::from_record(&record) {
        Ok(artist) => report.record_insert("artists", record.line, artist.insert(warehouse)),
        Err(e) => report.record_error(&e),
    }

    Ok(())
}

#[cfg(test)]
#[path = "song_file_test.rs"]
mod tests;
