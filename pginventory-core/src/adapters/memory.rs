//! In-memory catalog.
//!
//! Servers are keyed by their `host:port` label and described with plain
//! builders, so the collector, scanner and coordinator can be exercised
//! without a live PostgreSQL instance. Failures can be injected at every
//! level the inventory isolates: server, database and table.
//!
//! # Example
//! ```rust
//! use pginventory_core::adapters::memory::{MemoryConnector, MemoryDatabase, MemoryServer};
//! use pginventory_core::models::{ColumnInfo, TableDetails, TableRef};
//!
//! let connector = MemoryConnector::new().with_server(
//!     "db1:5432",
//!     MemoryServer::new("PostgreSQL 16.2").with_database(
//!         "app",
//!         MemoryDatabase::new().with_table(
//!             TableRef::new("public", "users"),
//!             TableDetails {
//!                 columns: vec![ColumnInfo::new("id", "integer", false, None)],
//!                 ..TableDetails::default()
//!             },
//!         ),
//!     ),
//! );
//! assert_eq!(connector.open_connections(), 0);
//! ```

use crate::adapters::config::DEFAULT_ADMIN_DATABASE;
use crate::adapters::{CatalogSource, Connector};
use crate::models::{ColumnInfo, TableDetails, TableRef};
use crate::security::ServerCredentials;
use crate::{Result, error::InventoryError};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One table held by a [`MemoryDatabase`].
#[derive(Debug, Clone)]
struct MemoryTable {
    table: TableRef,
    details: TableDetails,
    failing: bool,
}

/// A database with its extensions and tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    extensions: BTreeSet<String>,
    tables: Vec<MemoryTable>,
    unreachable: bool,
    failing_metadata: bool,
}

impl MemoryDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an installed extension.
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.insert(name.into());
        self
    }

    /// Adds a table. Tables are listed in (schema, table) order regardless of
    /// insertion order.
    #[must_use]
    pub fn with_table(mut self, table: TableRef, details: TableDetails) -> Self {
        self.tables.push(MemoryTable {
            table,
            details,
            failing: false,
        });
        self
    }

    /// Adds a table whose per-table queries all fail with a permission error.
    #[must_use]
    pub fn with_failing_table(mut self, table: TableRef) -> Self {
        self.tables.push(MemoryTable {
            table,
            details: TableDetails::default(),
            failing: true,
        });
        self
    }

    /// Connections to this database are refused.
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Version and extension queries fail.
    #[must_use]
    pub const fn with_failing_metadata(mut self) -> Self {
        self.failing_metadata = true;
        self
    }

    fn sorted_tables(&self) -> Vec<TableRef> {
        let mut tables: Vec<TableRef> = self.tables.iter().map(|t| t.table.clone()).collect();
        tables.sort();
        tables
    }

    fn find(&self, table: &TableRef) -> Option<&MemoryTable> {
        self.tables.iter().find(|t| &t.table == table)
    }
}

/// A server with its version string and databases.
#[derive(Debug, Clone, Default)]
pub struct MemoryServer {
    version: String,
    databases: BTreeMap<String, MemoryDatabase>,
    password: Option<String>,
    unreachable: bool,
    failing_listing: bool,
    latency: Duration,
}

impl MemoryServer {
    /// Creates a server reporting `version` from `SELECT version()`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Adds a database. Databases are listed in name order.
    #[must_use]
    pub fn with_database(mut self, name: impl Into<String>, database: MemoryDatabase) -> Self {
        self.databases.insert(name.into(), database);
        self
    }

    /// Rejects connections whose password differs from `password`.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Every connection to this server is refused.
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// The database listing query fails.
    #[must_use]
    pub const fn with_failing_listing(mut self) -> Self {
        self.failing_listing = true;
        self
    }

    /// Delays every connection attempt by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Opens [`MemoryCatalog`]s and tracks how many are still open.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    servers: HashMap<String, Arc<MemoryServer>>,
    admin_database: String,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self {
            servers: HashMap::new(),
            admin_database: DEFAULT_ADMIN_DATABASE.to_string(),
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MemoryConnector {
    /// Creates a connector with no servers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a server under its `host:port` label.
    #[must_use]
    pub fn with_server(mut self, label: impl Into<String>, server: MemoryServer) -> Self {
        self.servers.insert(label.into(), Arc::new(server));
        self
    }

    /// Overrides the administrative database name.
    #[must_use]
    pub fn with_admin_database(mut self, database: impl Into<String>) -> Self {
        self.admin_database = database.into();
        self
    }

    /// Connections opened so far.
    pub fn connections_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Connections opened and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.connections_opened()
            .saturating_sub(self.closed.load(Ordering::SeqCst))
    }
}

fn refused(context: String, reason: &str) -> InventoryError {
    InventoryError::connection_failed(
        context,
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, reason.to_string()),
    )
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(
        &self,
        credentials: &ServerCredentials,
        database: &str,
    ) -> Result<Box<dyn CatalogSource>> {
        let label = credentials.label();
        let context = format!("Failed to connect to database '{}' on {}", database, label);

        let Some(server) = self.servers.get(&label) else {
            return Err(refused(context, "no such host"));
        };

        if !server.latency.is_zero() {
            tokio::time::sleep(server.latency).await;
        }

        if server.unreachable {
            return Err(refused(context, "connection refused"));
        }
        if server
            .password
            .as_deref()
            .is_some_and(|expected| expected != credentials.password())
        {
            return Err(refused(context, "password authentication failed"));
        }

        let known = server.databases.get(database);
        if known.is_none() && database != self.admin_database {
            return Err(refused(context, "database does not exist"));
        }
        if known.is_some_and(|db| db.unreachable) {
            return Err(refused(context, "too many connections"));
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryCatalog {
            server: Arc::clone(server),
            label,
            database: database.to_string(),
            closed: Arc::clone(&self.closed),
        }))
    }

    fn admin_database(&self) -> &str {
        &self.admin_database
    }
}

/// A connection to one in-memory database.
#[derive(Debug)]
pub struct MemoryCatalog {
    server: Arc<MemoryServer>,
    label: String,
    database: String,
    closed: Arc<AtomicUsize>,
}

impl MemoryCatalog {
    fn current(&self) -> Option<&MemoryDatabase> {
        self.server.databases.get(&self.database)
    }

    fn query_failed(&self, what: &str) -> InventoryError {
        InventoryError::collection_failed(
            format!("{} in database '{}' on {}", what, self.database, self.label),
            std::io::Error::other("relation does not exist"),
        )
    }

    fn table(&self, table: &TableRef) -> Result<&TableDetails> {
        match self.current().and_then(|db| db.find(table)) {
            Some(entry) if entry.failing => Err(InventoryError::insufficient_privileges(format!(
                "permission denied for table {}",
                table
            ))),
            Some(entry) => Ok(&entry.details),
            None => Err(self.query_failed(&format!("table {}", table))),
        }
    }

    fn metadata_failing(&self) -> bool {
        self.current().is_some_and(|db| db.failing_metadata)
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn server_version(&self) -> Result<String> {
        if self.metadata_failing() {
            return Err(self.query_failed("server version"));
        }
        Ok(self.server.version.clone())
    }

    async fn extensions(&self) -> Result<Vec<String>> {
        if self.metadata_failing() {
            return Err(self.query_failed("extensions"));
        }
        Ok(self
            .current()
            .map(|db| db.extensions.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        if self.server.failing_listing {
            return Err(self.query_failed("database listing"));
        }
        Ok(self.server.databases.keys().cloned().collect())
    }

    async fn list_tables(&self) -> Result<Vec<TableRef>> {
        Ok(self
            .current()
            .map(MemoryDatabase::sorted_tables)
            .unwrap_or_default())
    }

    async fn estimated_row_count(&self, table: &TableRef) -> Result<i64> {
        Ok(self.table(table)?.rowcount)
    }

    async fn columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>> {
        Ok(self.table(table)?.columns.clone())
    }

    async fn primary_key(&self, table: &TableRef) -> Result<Vec<String>> {
        Ok(self.table(table)?.primary_keys.clone())
    }

    async fn indexes(&self, table: &TableRef) -> Result<Vec<String>> {
        Ok(self.table(table)?.indexes.clone())
    }

    async fn foreign_keys(&self, table: &TableRef) -> Result<Vec<String>> {
        Ok(self.table(table)?.foreign_keys.clone())
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(host: &str) -> ServerCredentials {
        ServerCredentials::new(host, 5432, "inventory", "secret")
    }

    fn connector() -> MemoryConnector {
        MemoryConnector::new().with_server(
            "db1:5432",
            MemoryServer::new("PostgreSQL 15.2")
                .with_database(
                    "zeta",
                    MemoryDatabase::new()
                        .with_extension("pgcrypto")
                        .with_extension("citext")
                        .with_table(TableRef::new("public", "users"), TableDetails::default())
                        .with_table(TableRef::new("audit", "events"), TableDetails::default())
                        .with_failing_table(TableRef::new("public", "secrets")),
                )
                .with_database("alpha", MemoryDatabase::new())
                .with_database("broken", MemoryDatabase::new().unreachable()),
        )
    }

    #[tokio::test]
    async fn test_lists_databases_and_tables_in_order() {
        let connector = connector();
        let admin = connector.open(&credentials("db1"), "postgres").await.unwrap();
        assert_eq!(
            admin.list_databases().await.unwrap(),
            vec!["alpha", "broken", "zeta"]
        );
        admin.close().await;

        let catalog = connector.open(&credentials("db1"), "zeta").await.unwrap();
        assert_eq!(
            catalog.list_tables().await.unwrap(),
            vec![
                TableRef::new("audit", "events"),
                TableRef::new("public", "secrets"),
                TableRef::new("public", "users"),
            ]
        );
        assert_eq!(catalog.extensions().await.unwrap(), vec!["citext", "pgcrypto"]);
        assert_eq!(catalog.server_version().await.unwrap(), "PostgreSQL 15.2");
        catalog.close().await;

        assert_eq!(connector.connections_opened(), 2);
        assert_eq!(connector.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_connection_failures() {
        let connector = connector();

        let unknown_host = connector.open(&credentials("db9"), "postgres").await;
        assert!(unknown_host.is_err_and(|e| e.is_connection_error()));

        let missing_db = connector.open(&credentials("db1"), "missing").await;
        assert!(missing_db.is_err_and(|e| e.is_connection_error()));

        let unreachable_db = connector.open(&credentials("db1"), "broken").await;
        assert!(unreachable_db.is_err_and(|e| e.is_connection_error()));

        assert_eq!(connector.connections_opened(), 0);
    }

    #[tokio::test]
    async fn test_admin_database_override() {
        let connector = connector().with_admin_database("maintenance");
        assert_eq!(connector.admin_database(), "maintenance");

        let default_admin = connector.open(&credentials("db1"), "postgres").await;
        assert!(default_admin.is_err_and(|e| e.is_connection_error()));

        let admin = connector
            .open(&credentials("db1"), "maintenance")
            .await
            .unwrap();
        assert_eq!(admin.list_databases().await.unwrap().len(), 3);
        admin.close().await;
        assert_eq!(connector.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_password_check() {
        let connector = MemoryConnector::new()
            .with_server("db1:5432", MemoryServer::new("PostgreSQL 16").with_password("right"));

        let wrong = ServerCredentials::new("db1", 5432, "inventory", "wrong");
        let result = connector.open(&wrong, "postgres").await;
        assert!(result.is_err_and(|e| !e.to_string().contains("wrong")));

        let right = ServerCredentials::new("db1", 5432, "inventory", "right");
        assert!(connector.open(&right, "postgres").await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_table_is_permission_error() {
        let connector = connector();
        let catalog = connector.open(&credentials("db1"), "zeta").await.unwrap();

        let error = catalog
            .columns(&TableRef::new("public", "secrets"))
            .await
            .unwrap_err();
        assert!(matches!(error, InventoryError::InsufficientPrivileges { .. }));
        assert!(
            catalog
                .columns(&TableRef::new("public", "users"))
                .await
                .is_ok()
        );
    }
}
