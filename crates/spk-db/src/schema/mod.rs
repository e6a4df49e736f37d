//! Star-schema DDL for the Sparkify warehouse.
//!
//! Each table's `CREATE TABLE IF NOT EXISTS` statement lives in a `.sql`
//! file embedded via `include_str!`. [`TABLES`] is ordered fact table first,
//! which is also the drop order.

use crate::error::DbError;
use duckdb::Connection;

/// A single warehouse table.
pub struct TableDef {
    /// Table name as it appears in SQL.
    pub name: &'static str,
    /// Idempotent CREATE statement.
    pub create_sql: &'static str,
    /// Column names in declaration order.
    pub columns: &'static [&'static str],
}

impl TableDef {
    /// `DROP TABLE IF EXISTS` statement for this table.
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quoted_name())
    }

    /// Name quoted as an identifier (`time` collides with the type name).
    pub fn quoted_name(&self) -> String {
        format!("\"{}\"", self.name)
    }
}

/// All warehouse tables: the `songplays` fact followed by its dimensions.
pub static TABLES: &[TableDef] = &[
    TableDef {
        name: "songplays",
        create_sql: include_str!("songplays.sql"),
        columns: &[
            "songplay_id",
            "start_time",
            "user_id",
            "level",
            "song_id",
            "artist_id",
            "session_id",
            "location",
            "user_agent",
        ],
    },
    TableDef {
        name: "users",
        create_sql: include_str!("users.sql"),
        columns: &["user_id", "first_name", "last_name", "gender", "level"],
    },
    TableDef {
        name: "songs",
        create_sql: include_str!("songs.sql"),
        columns: &["song_id", "title", "artist_id", "year", "duration"],
    },
    TableDef {
        name: "artists",
        create_sql: include_str!("artists.sql"),
        columns: &["artist_id", "name", "location", "latitude", "longitude"],
    },
    TableDef {
        name: "time",
        create_sql: include_str!("time.sql"),
        columns: &["start_time", "hour", "day", "week", "month", "year", "weekday"],
    },
];

/// Outcome of running one DDL statement per table.
#[derive(Debug, Default)]
pub struct SchemaReport {
    /// Tables whose statement succeeded.
    pub applied: Vec<&'static str>,
    /// Tables whose statement failed, with the error.
    pub failed: Vec<DbError>,
}

impl SchemaReport {
    /// Whether every statement succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drop every table. A failing statement is recorded and the rest still run.
pub(crate) fn drop_tables(conn: &Connection) -> SchemaReport {
    run_per_table(conn, |t| t.drop_sql())
}

/// Create every table. A failing statement is recorded and the rest still run.
pub(crate) fn create_tables(conn: &Connection) -> SchemaReport {
    run_per_table(conn, |t| t.create_sql.to_string())
}

fn run_per_table<F>(conn: &Connection, statement: F) -> SchemaReport
where
    F: Fn(&TableDef) -> String,
{
    let mut report = SchemaReport::default();
    for table in TABLES {
        let sql = statement(table);
        match conn.execute_batch(&sql) {
            Ok(()) => {
                log::debug!("Schema statement applied for {}", table.name);
                report.applied.push(table.name);
            }
            Err(e) => {
                log::error!("Schema statement for {} failed: {}", table.name, e);
                report.failed.push(DbError::SchemaError {
                    table: table.name.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    report
}
