//! Warehouse connection wrapper.
//!
//! [`Warehouse`] owns a DuckDB [`Connection`] and is the only way the
//! pipeline talks to the database: parameterized execute, single-row fetch,
//! and explicit per-file transactions. It performs no retries.

use crate::error::{DbError, DbResult};
use crate::schema::{self, SchemaReport, TableDef};
use duckdb::{Connection, Row, ToSql};
use spk_core::DatabaseConfig;
use std::cell::Cell;
use std::path::Path;

/// Shape of one table as found in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableShape {
    /// Table name.
    pub name: &'static str,
    /// Number of columns declared in the schema.
    pub expected_columns: usize,
    /// Number of columns found, or `None` if the table is missing.
    pub actual_columns: Option<usize>,
    /// Row count, or `None` if the table is missing.
    pub rows: Option<i64>,
}

impl TableShape {
    /// Whether the table exists with the declared number of columns.
    pub fn is_valid(&self) -> bool {
        self.actual_columns == Some(self.expected_columns)
    }
}

/// Wrapper around the warehouse DuckDB connection.
///
/// Single-threaded: the driver owns it for the whole run.
#[derive(Debug)]
pub struct Warehouse {
    conn: Connection,
    in_transaction: Cell<bool>,
}

impl Warehouse {
    /// Open the warehouse described by `config`.
    pub fn open(config: &DatabaseConfig) -> DbResult<Self> {
        if config.is_in_memory() {
            Self::open_memory()
        } else {
            Self::open_path(Path::new(&config.path))
        }
    }

    /// Open (or create) a warehouse file.
    pub fn open_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        log::debug!("Opened warehouse at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Create an in-memory warehouse.
    pub fn open_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            in_transaction: Cell::new(false),
        }
    }

    /// Execute one statement with bound parameters, returning affected rows.
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> DbResult<usize> {
        self.conn
            .execute(sql, params)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, compact(sql))))
    }

    /// Run `sql` and map the first result row, if any.
    pub fn fetch_one<T, F>(&self, sql: &str, params: &[&dyn ToSql], map: F) -> DbResult<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> duckdb::Result<T>,
    {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, compact(sql))))?;
        let mut rows = stmt.query(params)?;
        match rows.next()? {
            Some(row) => Ok(Some(map(row)?)),
            None => Ok(None),
        }
    }

    /// Start a transaction.
    pub fn begin(&self) -> DbResult<()> {
        if self.in_transaction.get() {
            return Err(DbError::TransactionError(
                "BEGIN failed: a transaction is already open".to_string(),
            ));
        }
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;
        self.in_transaction.set(true);
        Ok(())
    }

    /// Commit the open transaction. On failure the transaction is rolled back.
    pub fn commit(&self) -> DbResult<()> {
        if !self.in_transaction.get() {
            return Err(DbError::TransactionError(
                "COMMIT failed: no open transaction".to_string(),
            ));
        }
        self.in_transaction.set(false);
        if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
            let _ = self.conn.execute_batch("ROLLBACK");
            return Err(DbError::TransactionError(format!(
                "COMMIT failed: {commit_err}"
            )));
        }
        Ok(())
    }

    /// Roll back the open transaction, if any.
    pub fn rollback(&self) -> DbResult<()> {
        if !self.in_transaction.replace(false) {
            return Ok(());
        }
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))
    }

    /// Whether a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction.get()
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    pub fn transaction<F, T>(&self, body: F) -> DbResult<T>
    where
        F: FnOnce(&Self) -> DbResult<T>,
    {
        self.begin()?;
        match body(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = self.rollback() {
                    log::warn!("{rollback_err}");
                }
                Err(e)
            }
        }
    }

    /// Drop every warehouse table.
    pub fn drop_tables(&self) -> SchemaReport {
        schema::drop_tables(&self.conn)
    }

    /// Create every warehouse table.
    pub fn create_tables(&self) -> SchemaReport {
        schema::create_tables(&self.conn)
    }

    /// Check if a table exists in the main schema.
    pub fn table_exists(&self, name: &str) -> DbResult<bool> {
        Ok(self.column_count(name)? > 0)
    }

    /// Number of columns of a table in the main schema (0 if missing).
    pub fn column_count(&self, name: &str) -> DbResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.columns
             WHERE table_schema = 'main' AND table_name = ?",
            duckdb::params![name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Number of rows in a warehouse table.
    pub fn count_rows(&self, table: &TableDef) -> DbResult<i64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.quoted_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Compare every warehouse table against its declared shape.
    pub fn inspect_tables(&self) -> DbResult<Vec<TableShape>> {
        let mut shapes = Vec::with_capacity(schema::TABLES.len());
        for table in schema::TABLES {
            let columns = self.column_count(table.name)?;
            let (actual_columns, rows) = if columns == 0 {
                (None, None)
            } else {
                (Some(columns), Some(self.count_rows(table)?))
            };
            shapes.push(TableShape {
                name: table.name,
                expected_columns: table.columns.len(),
                actual_columns,
                rows,
            });
        }
        Ok(shapes)
    }

    /// Close the connection, surfacing any error DuckDB reports on shutdown.
    pub fn close(self) -> DbResult<()> {
        if self.in_transaction.get() {
            log::warn!("Closing warehouse with an open transaction; it will be rolled back");
        }
        self.conn
            .close()
            .map_err(|(_, e)| DbError::ConnectionError(format!("close failed: {e}")))
    }
}

/// Collapse whitespace so multi-line statements read well in error messages.
fn compact(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "warehouse_test.rs"]
mod tests;
