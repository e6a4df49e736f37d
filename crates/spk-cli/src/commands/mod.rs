//! CLI command implementations

pub(crate) mod check;
pub(crate) mod common;
pub(crate) mod create_tables;
pub(crate) mod etl;
