//! Time dimension derived from event timestamps.

use crate::error::{EtlError, EtlResult};
use chrono::{DateTime, Datelike, Timelike, Utc};
use spk_db::queries::TIME_INSERT;
use spk_db::{params, DbResult, Warehouse};

/// One row of the `time` table: an event instant broken into calendar parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRow {
    /// Milliseconds since the Unix epoch
    pub start_time: i64,
    pub hour: i32,
    pub day: i32,
    /// ISO 8601 week number
    pub week: i32,
    pub month: i32,
    /// Calendar year (not the ISO week-based year)
    pub year: i32,
    /// Monday = 0 through Sunday = 6
    pub weekday: i32,
}

impl TimeRow {
    /// Decompose a millisecond timestamp in UTC.
    pub fn from_millis(start_time: i64) -> Option<Self> {
        let at: DateTime<Utc> = DateTime::from_timestamp_millis(start_time)?;
        Some(Self {
            start_time,
            hour: at.hour() as i32,
            day: at.day() as i32,
            week: at.iso_week().week() as i32,
            month: at.month() as i32,
            year: at.year(),
            weekday: at.weekday().num_days_from_monday() as i32,
        })
    }

    /// Like [`TimeRow::from_millis`], reporting out-of-range timestamps.
    pub(crate) fn parse(start_time: i64, line: usize) -> EtlResult<Self> {
        Self::from_millis(start_time).ok_or_else(|| EtlError::InvalidField {
            field: "ts",
            line,
            message: format!("{} is outside the supported timestamp range", start_time),
        })
    }

    pub(crate) fn insert(&self, warehouse: &Warehouse) -> DbResult<usize> {
        warehouse.execute(
            TIME_INSERT,
            params![
                self.start_time,
                self.hour,
                self.day,
                self.week,
                self.month,
                self.year,
                self.weekday
            ],
        )
    }
}

#[cfg(test)]
#[path = "time_dim_test.rs"]
mod tests;
