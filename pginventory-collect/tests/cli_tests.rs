//! Command line parsing and server resolution tests.

#![allow(clippy::unwrap_used)]

use clap::Parser;
use pginventory_collect::servers::{load_servers_file, resolve_servers};
use pginventory_collect::{Cli, Command, LogFormatArg, RowEstimateArg};
use pginventory_core::adapters::RowEstimateMatch;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_defaults() {
    temp_env::with_var_unset("PGINVENTORY_SERVERS", || {
        let cli = Cli::try_parse_from(["pginventory"]).unwrap();

        assert!(cli.servers.is_empty());
        assert!(cli.command.is_none());
        assert_eq!(cli.output_dir, PathBuf::from("./output"));
        assert!(!cli.sequential);
        assert_eq!(cli.max_concurrency, 4);
        assert_eq!(cli.admin_database, "postgres");
        assert_eq!(cli.row_estimate_match, RowEstimateArg::SchemaQualified);
        assert_eq!(cli.global.log_format, LogFormatArg::Text);

        let inventory = cli.inventory_config();
        assert!(inventory.parallel);
        assert!(inventory.validate().is_ok());

        let connection = cli.connection_config();
        assert_eq!(connection.connect_timeout, Duration::from_secs(30));
        assert!(connection.validate().is_ok());
    });
}

#[test]
fn test_repeated_server_flags() {
    temp_env::with_var_unset("PGINVENTORY_SERVERS", || {
        let cli = Cli::try_parse_from([
            "pginventory",
            "--server",
            "postgres://a:pw@db1",
            "--server",
            "postgres://b:pw@db2:6543",
            "--sequential",
            "--max-concurrency",
            "8",
            "-o",
            "/tmp/reports",
            "--row-estimate-match",
            "relation-name",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.servers.len(), 2);
        assert_eq!(cli.global.verbose, 2);

        let inventory = cli.inventory_config();
        assert!(!inventory.parallel);
        assert_eq!(inventory.max_concurrency, 8);
        assert_eq!(inventory.output_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(
            cli.connection_config().row_estimate_match,
            RowEstimateMatch::RelationName
        );
    });
}

#[test]
fn test_servers_from_environment() {
    temp_env::with_var(
        "PGINVENTORY_SERVERS",
        Some("postgres://a:pw@db1,postgres://b@db2:6543"),
        || {
            let cli = Cli::try_parse_from(["pginventory"]).unwrap();
            let servers = resolve_servers(&cli.servers, None).unwrap();

            let labels: Vec<_> = servers.iter().map(|s| s.label()).collect();
            assert_eq!(labels, vec!["db1:5432", "db2:6543"]);
        },
    );
}

#[test]
fn test_test_subcommand() {
    temp_env::with_var_unset("PGINVENTORY_SERVERS", || {
        let cli = Cli::try_parse_from([
            "pginventory",
            "--server",
            "postgres://a@db1",
            "test",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Command::Test)));
        assert_eq!(cli.global.log_format, LogFormatArg::Json);
    });
}

#[test]
fn test_rejects_invalid_row_estimate_match() {
    let result = Cli::try_parse_from(["pginventory", "--row-estimate-match", "fuzzy"]);
    assert!(result.is_err());
}

#[test]
fn test_out_of_range_query_timeout_fails_validation() {
    temp_env::with_var_unset("PGINVENTORY_SERVERS", || {
        let cli = Cli::try_parse_from(["pginventory", "--query-timeout", "3600"]).unwrap();
        assert!(cli.connection_config().validate().is_err());
    });
}

#[test]
fn test_servers_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"host": "db1", "port": 5433, "username": "inventory", "password": "pw"}},
            {{"host": "db2", "username": "reader"}}
        ]"#
    )
    .unwrap();

    let servers = load_servers_file(file.path()).unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0].label(), "db1:5433");
    assert_eq!(servers[1].label(), "db2:5432");
    assert!(!servers[1].has_password());

    let urls = vec!["postgres://a:pw@db0".to_string()];
    let combined = resolve_servers(&urls, Some(file.path())).unwrap();
    let labels: Vec<_> = combined.iter().map(|s| s.label()).collect();
    assert_eq!(labels, vec!["db0:5432", "db1:5433", "db2:5432"]);
}

#[test]
fn test_servers_file_rejects_invalid_entry() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[{{"host": "", "username": "reader"}}]"#).unwrap();

    let err = load_servers_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("entry 1"));
}

#[test]
fn test_servers_file_missing() {
    let err = load_servers_file(std::path::Path::new("/nonexistent/servers.json")).unwrap_err();
    assert!(err.to_string().contains("servers file"));
}
