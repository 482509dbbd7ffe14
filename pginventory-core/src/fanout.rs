//! Fan-out of server scans.
//!
//! In parallel mode one scan per server is driven through
//! `futures::stream::buffer_unordered`, so results arrive in completion
//! order. Each scan returns its own records and the coordinator appends
//! them only after that scan has finished.

use crate::Result;
use crate::adapters::{Connector, InventoryConfig};
use crate::models::{FailureScope, InventoryRun, RunMetadata, ScanFailure, ScanOutcome};
use crate::reporter::InventoryReporter;
use crate::scanner::{ServerScanner, elapsed_ms};
use crate::security::ServerCredentials;
use futures::stream::{self, StreamExt};
use std::time::Instant;

/// Scans every server and merges the results.
///
/// A server whose scan fails is logged and recorded as a server-scoped
/// failure; it contributes no records and never aborts the other scans.
/// Merging is plain concatenation without deduplication.
///
/// # Example
/// ```rust
/// use pginventory_core::adapters::InventoryConfig;
/// use pginventory_core::adapters::memory::{MemoryConnector, MemoryServer};
/// use pginventory_core::fanout::run;
/// use pginventory_core::reporter::TracingReporter;
/// use pginventory_core::security::ServerCredentials;
///
/// # #[tokio::main]
/// # async fn main() {
/// let connector = MemoryConnector::new().with_server("db1:5432", MemoryServer::new("PostgreSQL 16"));
/// let servers = vec![ServerCredentials::new("db1", 5432, "inventory", "secret")];
///
/// let run = run(&servers, &InventoryConfig::default(), &connector, &TracingReporter).await;
/// assert!(run.records.is_empty());
/// assert_eq!(run.metadata.servers_failed, 0);
/// # }
/// ```
pub async fn run(
    servers: &[ServerCredentials],
    config: &InventoryConfig,
    connector: &dyn Connector,
    reporter: &dyn InventoryReporter,
) -> InventoryRun {
    let start = Instant::now();
    let started_at = chrono::Utc::now();

    tracing::info!(
        "Starting inventory of {} servers (parallel: {}, max_concurrency: {})",
        servers.len(),
        config.parallel,
        config.max_concurrency
    );

    let scanner = ServerScanner::new(connector, reporter);
    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut servers_failed = 0;

    let mut merge = |server: String, result: Result<ScanOutcome>| match result {
        Ok(outcome) => {
            records.extend(outcome.records);
            failures.extend(outcome.failures);
        }
        Err(e) => {
            servers_failed += 1;
            let failure = ScanFailure::from_error(server, FailureScope::Server, &e);
            reporter.failure(&failure);
            failures.push(failure);
        }
    };

    if config.parallel {
        let scanner = &scanner;
        let scans = servers.iter().map(|credentials| async move {
            (credentials.label(), scanner.scan(credentials).await)
        });

        let mut completed = stream::iter(scans).buffer_unordered(config.max_concurrency.max(1));
        while let Some((server, result)) = completed.next().await {
            merge(server, result);
        }
    } else {
        for credentials in servers {
            let result = scanner.scan(credentials).await;
            merge(credentials.label(), result);
        }
    }

    let metadata = RunMetadata {
        started_at,
        duration_ms: elapsed_ms(start),
        servers_configured: servers.len(),
        servers_failed,
        parallel: config.parallel,
        collector_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    reporter.run_finished(&metadata);

    InventoryRun {
        records,
        failures,
        metadata,
    }
}

/// Result of a connectivity check against one server.
#[derive(Debug)]
pub struct ConnectivityCheck {
    /// Server label (`host:port`)
    pub server: String,
    /// `Ok` with the server version string, or the connection error
    pub result: Result<String>,
}

/// Opens the administrative connection of every server and reads its
/// version, without collecting anything.
///
/// Checks run sequentially in input order.
pub async fn check_connectivity(
    servers: &[ServerCredentials],
    connector: &dyn Connector,
) -> Vec<ConnectivityCheck> {
    let mut checks = Vec::with_capacity(servers.len());

    for credentials in servers {
        let server = credentials.label();
        let result = match connector.open(credentials, connector.admin_database()).await {
            Ok(admin) => {
                let version = admin.server_version().await;
                admin.close().await;
                version
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(version) => tracing::info!("Connection to {} successful: {}", server, version),
            Err(e) => tracing::error!("Connection to {} failed: {}", server, e),
        }

        checks.push(ConnectivityCheck { server, result });
    }

    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryConnector, MemoryDatabase, MemoryServer};
    use crate::models::{TableDetails, TableRef};
    use crate::reporter::testing::RecordingReporter;
    use std::time::Duration;

    fn server_with_table(table: &str) -> MemoryServer {
        MemoryServer::new("PostgreSQL 16.2").with_database(
            "app",
            MemoryDatabase::new().with_table(TableRef::new("public", table), TableDetails::default()),
        )
    }

    fn creds(host: &str) -> ServerCredentials {
        ServerCredentials::new(host, 5432, "inventory", "secret")
    }

    #[tokio::test]
    async fn test_parallel_merges_in_completion_order() {
        let connector = MemoryConnector::new()
            .with_server(
                "slow:5432",
                server_with_table("slow_table").with_latency(Duration::from_millis(200)),
            )
            .with_server("fast:5432", server_with_table("fast_table"));
        let reporter = RecordingReporter::default();
        let servers = vec![creds("slow"), creds("fast")];

        let run = run(&servers, &InventoryConfig::default(), &connector, &reporter).await;

        let servers_in_order: Vec<_> = run.records.iter().map(|r| r.server.as_str()).collect();
        assert_eq!(servers_in_order, vec!["fast:5432", "slow:5432"]);
        assert!(run.metadata.parallel);
        assert_eq!(run.metadata.servers_configured, 2);
    }

    #[tokio::test]
    async fn test_sequential_keeps_input_order() {
        let connector = MemoryConnector::new()
            .with_server(
                "slow:5432",
                server_with_table("slow_table").with_latency(Duration::from_millis(50)),
            )
            .with_server("fast:5432", server_with_table("fast_table"));
        let reporter = RecordingReporter::default();
        let servers = vec![creds("slow"), creds("fast")];
        let config = InventoryConfig::new().with_parallel(false);

        let run = run(&servers, &config, &connector, &reporter).await;

        let servers_in_order: Vec<_> = run.records.iter().map(|r| r.server.as_str()).collect();
        assert_eq!(servers_in_order, vec!["slow:5432", "fast:5432"]);
        assert!(!run.metadata.parallel);
    }

    #[tokio::test]
    async fn test_failed_server_does_not_block_others() {
        let connector = MemoryConnector::new()
            .with_server("down:5432", server_with_table("t").unreachable())
            .with_server("up:5432", server_with_table("users"));
        let reporter = RecordingReporter::default();
        let servers = vec![creds("down"), creds("up")];

        let run = run(&servers, &InventoryConfig::default(), &connector, &reporter).await;

        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].server, "up:5432");
        assert_eq!(run.metadata.servers_failed, 1);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].server, "down:5432");
        assert_eq!(run.failures[0].scope, FailureScope::Server);
        assert!(run.failures[0].is_connection_error);
        assert!(
            reporter
                .events()
                .contains(&"run finished (2)".to_string())
        );
    }

    #[tokio::test]
    async fn test_all_servers_failed() {
        let connector = MemoryConnector::new()
            .with_server("down:5432", server_with_table("t").unreachable());
        let reporter = RecordingReporter::default();

        let run = run(&[creds("down")], &InventoryConfig::default(), &connector, &reporter).await;

        assert!(run.records.is_empty());
        assert_eq!(run.metadata.servers_failed, 1);
    }

    #[tokio::test]
    async fn test_no_servers() {
        let connector = MemoryConnector::new();
        let reporter = RecordingReporter::default();

        let run = run(&[], &InventoryConfig::default(), &connector, &reporter).await;

        assert!(run.records.is_empty());
        assert!(run.failures.is_empty());
    }

    #[tokio::test]
    async fn test_check_connectivity() {
        let connector = MemoryConnector::new()
            .with_server("down:5432", server_with_table("t").unreachable())
            .with_server("up:5432", server_with_table("users"));

        let checks = check_connectivity(&[creds("up"), creds("down")], &connector).await;

        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].server, "up:5432");
        assert!(checks[0].result.as_ref().is_ok_and(|v| v == "PostgreSQL 16.2"));
        assert!(checks[1].result.is_err());
        assert_eq!(connector.open_connections(), 0);
    }
}
