//! Database connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default administrative database.
pub const DEFAULT_ADMIN_DATABASE: &str = "postgres";

/// How the planner row estimate is matched to a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowEstimateMatch {
    /// Match `pg_class` by relation name and schema.
    #[default]
    SchemaQualified,
    /// Match `pg_class` by bare relation name and take the first row.
    ///
    /// Tables sharing a name across schemas may receive each other's
    /// estimate.
    RelationName,
}

/// Configuration for catalog connections.
///
/// Credentials are not part of this struct; they travel separately as
/// [`crate::security::ServerCredentials`].
///
/// # Example
/// ```rust
/// use pginventory_core::adapters::ConnectionConfig;
/// use std::time::Duration;
///
/// let config = ConnectionConfig::new()
///     .with_admin_database("template_admin")
///     .with_connect_timeout(Duration::from_secs(5));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database used for the administrative (database listing) connection
    pub admin_database: String,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Per-statement timeout duration
    pub query_timeout: Duration,
    /// `application_name` reported to the server
    pub application_name: String,
    /// Whether to force read-only sessions
    pub read_only: bool,
    /// Row estimate matching strategy
    pub row_estimate_match: RowEstimateMatch,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            admin_database: DEFAULT_ADMIN_DATABASE.to_string(),
            connect_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(30),
            application_name: format!("pginventory-{}", env!("CARGO_PKG_VERSION")),
            read_only: true,
            row_estimate_match: RowEstimateMatch::default(),
        }
    }
}

impl ConnectionConfig {
    /// Creates a configuration with safe defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid or unsafe
    pub fn validate(&self) -> crate::Result<()> {
        if self.admin_database.trim().is_empty() {
            return Err(crate::error::InventoryError::configuration(
                "admin_database cannot be empty",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::InventoryError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.query_timeout.as_secs() == 0 {
            return Err(crate::error::InventoryError::configuration(
                "query_timeout must be at least 1 second",
            ));
        }

        if self.query_timeout > Duration::from_secs(300) {
            return Err(crate::error::InventoryError::configuration(
                "query_timeout should not exceed 300 seconds",
            ));
        }

        Ok(())
    }

    /// Builder method to set the administrative database.
    #[must_use]
    pub fn with_admin_database(mut self, database: impl Into<String>) -> Self {
        self.admin_database = database.into();
        self
    }

    /// Builder method to set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the statement timeout.
    #[must_use]
    pub const fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Builder method to set the row estimate matching strategy.
    #[must_use]
    pub const fn with_row_estimate_match(mut self, strategy: RowEstimateMatch) -> Self {
        self.row_estimate_match = strategy;
        self
    }
}
