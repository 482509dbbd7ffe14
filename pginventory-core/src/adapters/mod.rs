//! Catalog access traits and their implementations.
//!
//! The collector, scanner and coordinator only see these traits, so a
//! server can be backed by a live PostgreSQL connection or by the in-memory
//! catalog used for fixtures.
//!
//! # Module Structure
//! - `config`: connection and run configuration
//! - `helpers`: row decoding helpers shared by SQL adapters
//! - `memory`: in-memory catalog
//! - `postgres`: live PostgreSQL catalog (feature `postgresql`)

use crate::{
    Result,
    models::{ColumnInfo, TableRef},
    security::ServerCredentials,
};
use async_trait::async_trait;

pub mod config;
pub mod memory;

#[cfg(feature = "postgresql")]
pub mod helpers;
#[cfg(feature = "postgresql")]
pub mod postgres;

pub use config::{ConnectionConfig, InventoryConfig, RowEstimateMatch};

/// One open connection to one database, exposing the catalog queries the
/// inventory needs.
///
/// All methods are read-only. Implementations own their connection; callers
/// must call [`CatalogSource::close`] when done, including after errors.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Raw server version string (`SELECT version()`).
    async fn server_version(&self) -> Result<String>;

    /// Names of extensions installed in this database.
    async fn extensions(&self) -> Result<Vec<String>>;

    /// Non-template databases on the server, in name order.
    async fn list_databases(&self) -> Result<Vec<String>>;

    /// Tables outside the system schemas, ordered by schema then name.
    async fn list_tables(&self) -> Result<Vec<TableRef>>;

    /// Planner row-count estimate for a table.
    async fn estimated_row_count(&self, table: &TableRef) -> Result<i64>;

    /// Column definitions in ordinal order.
    async fn columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>>;

    /// Primary key columns in key order; empty if the table has none.
    async fn primary_key(&self, table: &TableRef) -> Result<Vec<String>>;

    /// Raw index definitions.
    async fn indexes(&self, table: &TableRef) -> Result<Vec<String>>;

    /// Foreign keys formatted as `"<constraint_name>: <definition>"`.
    async fn foreign_keys(&self, table: &TableRef) -> Result<Vec<String>>;

    /// Closes the underlying connection.
    async fn close(&self);
}

/// Opens catalog connections for a server.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a connection to `database` on the server described by
    /// `credentials`.
    ///
    /// # Errors
    /// Returns a connection error if the host is unreachable, authentication
    /// fails, or the database does not exist.
    async fn open(
        &self,
        credentials: &ServerCredentials,
        database: &str,
    ) -> Result<Box<dyn CatalogSource>>;

    /// Name of the well-known database used for the administrative
    /// connection.
    fn admin_database(&self) -> &str;
}
