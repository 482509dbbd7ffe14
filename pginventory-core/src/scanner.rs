//! Scanning of one server.
//!
//! The scanner lists the server's non-template databases over an
//! administrative connection, then collects each database over its own
//! connection. Connections are closed on every path.

use crate::Result;
use crate::adapters::{CatalogSource, Connector};
use crate::collector::collect_database;
use crate::models::{FailureScope, ScanFailure, ScanOutcome};
use crate::reporter::InventoryReporter;
use crate::security::ServerCredentials;
use std::time::Instant;

/// Milliseconds elapsed since `start`, saturating.
pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Scans servers through a [`Connector`].
pub struct ServerScanner<'a> {
    connector: &'a dyn Connector,
    reporter: &'a dyn InventoryReporter,
}

impl<'a> ServerScanner<'a> {
    /// Creates a scanner that opens connections with `connector` and reports
    /// events to `reporter`.
    pub fn new(connector: &'a dyn Connector, reporter: &'a dyn InventoryReporter) -> Self {
        Self {
            connector,
            reporter,
        }
    }

    /// Scans every non-template database of one server.
    ///
    /// Database connection and collection failures are isolated into
    /// [`ScanOutcome::failures`]; the scan continues with the next database.
    ///
    /// # Errors
    /// Returns an error if the administrative connection cannot be opened or
    /// the database listing fails. No records are produced in that case.
    pub async fn scan(&self, credentials: &ServerCredentials) -> Result<ScanOutcome> {
        let start = Instant::now();
        let server = credentials.label();
        self.reporter.server_started(&server);

        let databases = self.list_databases(credentials).await?;
        tracing::debug!("Found {} databases on {}", databases.len(), server);

        let mut outcome = ScanOutcome {
            server: server.clone(),
            records: Vec::new(),
            failures: Vec::new(),
            databases_found: databases.len(),
            databases_scanned: 0,
            duration_ms: 0,
        };

        for database in &databases {
            let collected = match self.connector.open(credentials, database).await {
                Ok(source) => {
                    let result =
                        collect_database(source.as_ref(), &server, database, self.reporter).await;
                    source.close().await;
                    result
                }
                Err(e) => Err(e),
            };

            match collected {
                Ok(collection) => {
                    self.reporter
                        .database_collected(&server, database, collection.records.len());
                    outcome.databases_scanned += 1;
                    outcome.records.extend(collection.records);
                    outcome.failures.extend(collection.failures);
                }
                Err(e) => {
                    let failure = ScanFailure::from_error(
                        &server,
                        FailureScope::Database {
                            database: database.clone(),
                        },
                        &e,
                    );
                    self.reporter.failure(&failure);
                    outcome.failures.push(failure);
                }
            }
        }

        outcome.duration_ms = elapsed_ms(start);
        self.reporter.server_finished(&outcome);
        Ok(outcome)
    }

    /// Lists databases over the administrative connection, closing it
    /// whether or not the listing succeeds.
    async fn list_databases(&self, credentials: &ServerCredentials) -> Result<Vec<String>> {
        let admin: Box<dyn CatalogSource> = self
            .connector
            .open(credentials, self.connector.admin_database())
            .await?;
        let databases = admin.list_databases().await;
        admin.close().await;
        databases
    }
}
