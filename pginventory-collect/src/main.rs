//! PostgreSQL schema inventory tool.
//!
//! This binary scans PostgreSQL servers and writes an inventory of every
//! table's columns, keys, indexes and row estimates to JSONL and Markdown.
//!
//! # Security Guarantees
//! - Read-only database sessions only
//! - No credentials logged or written to the reports

use anyhow::Context;
use clap::Parser;
use pginventory_collect::servers::{
    fill_missing_passwords, prompt_password, redacted_urls, resolve_servers,
};
use pginventory_collect::{Cli, Command};
use pginventory_core::fanout::{check_connectivity, run};
use pginventory_core::logging::init_logging;
use pginventory_core::report::write_reports;
use pginventory_core::{PgConnector, ServerCredentials, TracingReporter};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(
        cli.global.verbose,
        cli.global.quiet,
        cli.global.log_format.into(),
    )?;

    if !cli.servers.is_empty() {
        info!("Servers: {}", redacted_urls(&cli.servers).join(", "));
    }
    let mut servers = resolve_servers(&cli.servers, cli.servers_file.as_deref())?;
    if cli.prompt_password {
        servers = fill_missing_passwords(servers, prompt_password)?;
    }

    let connector =
        PgConnector::new(cli.connection_config()).context("Invalid connection settings")?;

    match cli.command {
        Some(Command::Test) => test_connections(&servers, &connector).await,
        None => collect_inventory(&cli, &servers, &connector).await,
    }
}

/// Checks the administrative connection of every server.
async fn test_connections(
    servers: &[ServerCredentials],
    connector: &PgConnector,
) -> anyhow::Result<()> {
    info!("Testing {} server connections...", servers.len());

    let checks = check_connectivity(servers, connector).await;
    let mut failed = 0;
    for check in &checks {
        match &check.result {
            Ok(version) => println!("{}: OK ({})", check.server, version),
            Err(e) => {
                failed += 1;
                println!("{}: FAILED ({})", check.server, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} servers unreachable", failed, checks.len());
    }
    Ok(())
}

/// Scans all servers and writes both reports.
async fn collect_inventory(
    cli: &Cli,
    servers: &[ServerCredentials],
    connector: &PgConnector,
) -> anyhow::Result<()> {
    let config = cli.inventory_config();
    config.validate()?;

    info!("Output: {}", config.output_dir.display());

    let inventory = run(servers, &config, connector, &TracingReporter).await;

    if !inventory.failures.is_empty() {
        warn!(
            "{} failures during inventory ({} servers failed entirely)",
            inventory.failures.len(),
            inventory.metadata.servers_failed
        );
    }

    let paths = write_reports(&config.output_dir, &inventory.records)
        .await
        .context("Failed to write inventory reports")?;

    println!("Inventory completed");
    println!("Tables: {}", inventory.records.len());
    println!(
        "Servers: {} ({} failed)",
        inventory.metadata.servers_configured, inventory.metadata.servers_failed
    );
    println!("Failures: {}", inventory.failures.len());
    println!("JSONL: {}", paths.jsonl.display());
    println!("Markdown: {}", paths.markdown.display());

    Ok(())
}
