//! Run lifecycle reporting.
//!
//! Components never log progress through ambient global state of their own;
//! they receive an [`InventoryReporter`] from the caller and tell it what
//! happened. [`TracingReporter`] forwards every event to `tracing`.

use crate::models::{RunMetadata, ScanFailure, ScanOutcome};

/// Receives lifecycle events from one inventory run.
///
/// All methods have empty default bodies so implementations only override
/// the events they care about.
pub trait InventoryReporter: Send + Sync {
    /// A server scan is about to start.
    fn server_started(&self, _server: &str) {}

    /// A database was collected; `tables` records were produced.
    fn database_collected(&self, _server: &str, _database: &str, _tables: usize) {}

    /// A failure was isolated and the run continues.
    fn failure(&self, _failure: &ScanFailure) {}

    /// A server scan completed (possibly with isolated failures).
    fn server_finished(&self, _outcome: &ScanOutcome) {}

    /// The whole run completed.
    fn run_finished(&self, _metadata: &RunMetadata) {}
}

/// Reporter that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl InventoryReporter for TracingReporter {
    fn server_started(&self, server: &str) {
        tracing::info!("Scanning server {}", server);
    }

    fn database_collected(&self, server: &str, database: &str, tables: usize) {
        tracing::info!(
            "Collected {} tables from database '{}' on {}",
            tables,
            database,
            server
        );
    }

    fn failure(&self, failure: &ScanFailure) {
        tracing::error!(
            server = %failure.server,
            connection_error = failure.is_connection_error,
            "Failed to collect {} on {}: {}",
            failure.scope,
            failure.server,
            failure.error_message
        );
    }

    fn server_finished(&self, outcome: &ScanOutcome) {
        tracing::info!(
            "Finished {}: {} of {} databases, {} tables, {} failures in {}ms",
            outcome.server,
            outcome.databases_scanned,
            outcome.databases_found,
            outcome.records.len(),
            outcome.failures.len(),
            outcome.duration_ms
        );
    }

    fn run_finished(&self, metadata: &RunMetadata) {
        tracing::info!(
            "Inventory of {} servers finished in {}ms ({} failed, parallel: {})",
            metadata.servers_configured,
            metadata.duration_ms,
            metadata.servers_failed,
            metadata.parallel
        );
    }
}
