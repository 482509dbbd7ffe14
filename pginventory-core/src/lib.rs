//! Core data structures and scanning logic for pginventory.
//!
//! This crate inventories the schema metadata of PostgreSQL servers: for
//! every non-template database it records the server version, installed
//! extensions, and per table the row estimate, columns, primary key, indexes
//! and foreign keys. Results are written as line-delimited JSON and Markdown.
//!
//! # Security Guarantees
//! - All catalog sessions are read-only
//! - Passwords are zeroed on drop and never logged or written to reports
//! - Only system catalogs and `information_schema` are queried
//!
//! # Architecture
//! - `adapters`: `Connector`/`CatalogSource` traits with PostgreSQL and
//!   in-memory implementations
//! - `collector`: one database to a set of table records
//! - `scanner`: one server to all of its databases
//! - `fanout`: many servers, sequentially or with bounded concurrency
//! - `report`: JSONL and Markdown writers

pub mod adapters;
pub mod collector;
pub mod error;
pub mod fanout;
pub mod logging;
pub mod models;
pub mod report;
pub mod reporter;
pub mod scanner;
pub mod security;

// Re-export commonly used types
pub use adapters::{
    CatalogSource, ConnectionConfig, Connector, InventoryConfig, RowEstimateMatch,
};
pub use error::{InventoryError, Result};
pub use models::{
    ColumnInfo, FailureScope, InventoryRun, RunMetadata, ScanFailure, ScanOutcome, TableRecord,
    TableRef,
};
pub use reporter::{InventoryReporter, TracingReporter};
pub use security::ServerCredentials;

#[cfg(feature = "postgresql")]
pub use adapters::postgres::PgConnector;
