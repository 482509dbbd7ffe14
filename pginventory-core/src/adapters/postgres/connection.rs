//! PostgreSQL connection setup.
//!
//! Each opened catalog gets its own single-connection pool, so a scan task
//! owns its connections exclusively and closing the catalog closes the
//! socket.

use super::PgCatalog;
use crate::adapters::{CatalogSource, ConnectionConfig, Connector};
use crate::security::ServerCredentials;
use crate::{Result, error::InventoryError};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

/// Opens read-only catalog connections to PostgreSQL servers.
#[derive(Debug, Clone)]
pub struct PgConnector {
    config: ConnectionConfig,
}

impl PgConnector {
    /// Creates a connector with the given configuration.
    ///
    /// # Errors
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Connection configuration in use.
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Builds driver options for one database.
    ///
    /// Credentials are passed as discrete options; no connection URL
    /// containing the password is ever built.
    pub fn connect_options(
        &self,
        credentials: &ServerCredentials,
        database: &str,
    ) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(credentials.host())
            .port(credentials.port())
            .username(credentials.username())
            .password(credentials.password())
            .database(database)
            .application_name(&self.config.application_name)
    }

    /// Creates a single-connection pool and connects eagerly so that an
    /// unreachable host, bad credentials or a missing database fail here.
    ///
    /// # Session settings
    /// Every connection gets a statement timeout, a lock timeout and,
    /// unless disabled, `default_transaction_read_only = on`. Statements run
    /// in auto-commit mode.
    pub(crate) async fn create_pool(
        &self,
        credentials: &ServerCredentials,
        database: &str,
    ) -> Result<PgPool> {
        use sqlx::Executor;

        let query_timeout_secs = self.config.query_timeout.as_secs();
        let read_only = self.config.read_only;

        PgPoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .acquire_timeout(self.config.connect_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(
                        format!("SET statement_timeout = '{}s'", query_timeout_secs).as_str(),
                    )
                    .await?;

                    conn.execute("SET lock_timeout = '30s'").await?;

                    if read_only {
                        conn.execute("SET default_transaction_read_only = on")
                            .await?;
                    }

                    Ok(())
                })
            })
            .connect_with(self.connect_options(credentials, database))
            .await
            .map_err(|e| {
                InventoryError::connection_failed(
                    format!(
                        "Failed to connect to database '{}' on {}",
                        database,
                        credentials.label()
                    ),
                    e,
                )
            })
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn open(
        &self,
        credentials: &ServerCredentials,
        database: &str,
    ) -> Result<Box<dyn CatalogSource>> {
        tracing::debug!("Connecting to {}/{}", credentials.label(), database);

        let pool = self.create_pool(credentials, database).await?;

        Ok(Box::new(PgCatalog::new(
            pool,
            credentials.label(),
            database,
            self.config.row_estimate_match,
        )))
    }

    fn admin_database(&self) -> &str {
        &self.config.admin_database
    }
}
