//! Inventory data models.
//!
//! `TableRecord` is the unit of output: one per (server, database, schema,
//! table). Database-level facts (version, extensions) are copied into every
//! record of the same database. Records are validated at construction and
//! not mutated afterwards.

use crate::{Result, error::InventoryError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One column definition as reported by `information_schema.columns`.
///
/// Serialized with the catalog's own field names; nullability is written as
/// the catalog's `YES`/`NO` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    #[serde(rename = "column_name")]
    pub name: String,
    /// SQL data type name (e.g. `integer`, `character varying`)
    pub data_type: String,
    /// Whether the column accepts NULL
    #[serde(rename = "is_nullable", with = "yes_no")]
    pub nullable: bool,
    /// Default expression, if any
    #[serde(rename = "column_default")]
    pub default: Option<String>,
}

impl ColumnInfo {
    /// Creates a column definition.
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        nullable: bool,
        default: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default,
        }
    }

    /// Nullability as the catalog spells it.
    pub const fn nullable_label(&self) -> &'static str {
        if self.nullable { "YES" } else { "NO" }
    }
}

mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "YES" } else { "NO" })
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "YES" => Ok(true),
            "NO" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected YES or NO, found '{}'",
                other
            ))),
        }
    }
}

/// A (schema, table) pair found by catalog enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    /// Schema (namespace) name
    pub schema: String,
    /// Table or view name
    pub table: String,
}

impl TableRef {
    /// Creates a table reference.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Facts gathered once per database and shared by all of its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseFacts {
    /// Server label (`host:port`)
    pub server: String,
    /// Database name
    pub database: String,
    /// Raw `version()` string
    pub postgres_version: String,
    /// Installed extension names
    pub extensions: BTreeSet<String>,
}

/// Per-table facts from the four introspection queries plus the row estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDetails {
    /// Planner row-count estimate
    pub rowcount: i64,
    /// Columns in ordinal order
    pub columns: Vec<ColumnInfo>,
    /// Primary key columns in key order
    pub primary_keys: Vec<String>,
    /// Raw index definitions
    pub indexes: Vec<String>,
    /// `"<constraint_name>: <definition>"` strings
    pub foreign_keys: Vec<String>,
}

/// Inventory record for one table.
///
/// Field order matches the line-delimited report format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    /// Server label (`host:port`)
    pub server: String,
    /// Database name
    pub database: String,
    /// Schema name
    pub schema: String,
    /// Table name
    pub table: String,
    /// Raw server version string
    pub postgres_version: String,
    /// Installed extension names for the database
    pub extensions: BTreeSet<String>,
    /// Planner row-count estimate (not an exact count)
    pub rowcount: i64,
    /// Primary key columns; empty when the table has none
    pub primary_keys: Vec<String>,
    /// Column definitions in ordinal order
    pub columns: Vec<ColumnInfo>,
    /// Raw index definitions
    pub indexes: Vec<String>,
    /// Foreign keys as `"<constraint_name>: <definition>"`
    pub foreign_keys: Vec<String>,
}

impl TableRecord {
    /// Combines database-level and table-level facts into a validated record.
    ///
    /// # Errors
    /// Returns a validation error if any identity field or column name is empty.
    pub fn new(facts: &DatabaseFacts, table: TableRef, details: TableDetails) -> Result<Self> {
        let record = Self {
            server: facts.server.clone(),
            database: facts.database.clone(),
            schema: table.schema,
            table: table.table,
            postgres_version: facts.postgres_version.clone(),
            extensions: facts.extensions.clone(),
            rowcount: details.rowcount,
            primary_keys: details.primary_keys,
            columns: details.columns,
            indexes: details.indexes,
            foreign_keys: details.foreign_keys,
        };
        record.validate()?;
        Ok(record)
    }

    /// Field-presence checks applied at construction.
    ///
    /// # Errors
    /// Returns a validation error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let identity = [
            ("server", &self.server),
            ("database", &self.database),
            ("schema", &self.schema),
            ("table", &self.table),
        ];
        for (field, value) in identity {
            if value.is_empty() {
                return Err(InventoryError::validation(format!(
                    "{} cannot be empty",
                    field
                )));
            }
        }

        if let Some(position) = self.columns.iter().position(|c| c.name.is_empty()) {
            return Err(InventoryError::validation(format!(
                "column {} of {}.{} has an empty name",
                position + 1,
                self.schema,
                self.table
            )));
        }

        if self.primary_keys.iter().any(String::is_empty) {
            return Err(InventoryError::validation(format!(
                "primary key of {}.{} contains an empty column name",
                self.schema, self.table
            )));
        }

        Ok(())
    }

    /// `schema.table` of this record.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

/// Where a collection failure happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum FailureScope {
    /// The whole server (administrative connection or database listing)
    Server,
    /// One database (its connection or database-level queries)
    Database {
        /// Database name
        database: String,
    },
    /// One table's introspection queries
    Table {
        /// Database name
        database: String,
        /// Schema name
        schema: String,
        /// Table name
        table: String,
    },
}

impl std::fmt::Display for FailureScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Database { database } => write!(f, "database '{}'", database),
            Self::Table {
                database,
                schema,
                table,
            } => write!(f, "table '{}.{}' in database '{}'", schema, table, database),
        }
    }
}

/// A failure that was isolated and logged instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFailure {
    /// Server label (`host:port`)
    pub server: String,
    /// Scope of the failure
    #[serde(flatten)]
    pub scope: FailureScope,
    /// Error message (credentials sanitized)
    pub error_message: String,
    /// Whether this was a connection failure rather than a query failure
    pub is_connection_error: bool,
}

impl ScanFailure {
    /// Builds a failure record from an error.
    pub fn from_error(server: impl Into<String>, scope: FailureScope, error: &InventoryError) -> Self {
        Self {
            server: server.into(),
            scope,
            error_message: error.to_string(),
            is_connection_error: error.is_connection_error(),
        }
    }
}

/// Records and isolated failures from one database.
#[derive(Debug, Clone, Default)]
pub struct DatabaseCollection {
    /// One record per successfully introspected table
    pub records: Vec<TableRecord>,
    /// Tables whose introspection failed
    pub failures: Vec<ScanFailure>,
}

/// Result of scanning one server.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Server label (`host:port`)
    pub server: String,
    /// Records in database then table enumeration order
    pub records: Vec<TableRecord>,
    /// Database and table failures that were isolated
    pub failures: Vec<ScanFailure>,
    /// Number of non-template databases found
    pub databases_found: usize,
    /// Number of databases collected without a database-level failure
    pub databases_scanned: usize,
    /// Wall time of the scan in milliseconds
    pub duration_ms: u64,
}

/// Summary of one inventory run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// When the run started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
    /// Servers passed to the run
    pub servers_configured: usize,
    /// Servers whose scan failed outright
    pub servers_failed: usize,
    /// Whether servers were scanned concurrently
    pub parallel: bool,
    /// Collector version
    pub collector_version: String,
}

/// Everything produced by one run of the fan-out coordinator.
#[derive(Debug, Clone)]
pub struct InventoryRun {
    /// Merged records from all servers
    pub records: Vec<TableRecord>,
    /// Every isolated failure, server-level ones included
    pub failures: Vec<ScanFailure>,
    /// Run statistics
    pub metadata: RunMetadata,
}
