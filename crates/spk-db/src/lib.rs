//! spk-db - Database gateway for the Sparkify ETL
//!
//! This crate owns the DuckDB connection lifecycle, the star-schema DDL,
//! and the parameterized statements the pipeline runs against it.

pub mod error;
pub mod queries;
pub mod schema;
pub mod warehouse;

pub use duckdb::params;
pub use error::{DbError, DbResult};
pub use schema::{SchemaReport, TableDef, TABLES};
pub use warehouse::{TableShape, Warehouse};
