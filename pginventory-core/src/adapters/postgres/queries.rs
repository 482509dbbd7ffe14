//! Catalog queries used by the PostgreSQL adapter.
//!
//! Every identifier column is cast to `text` so decoding does not depend on
//! the `name`/`sql_identifier` domain types.

use crate::adapters::RowEstimateMatch;

/// Non-template databases on the server.
pub(super) const LIST_DATABASES: &str = r#"
    SELECT datname::text AS datname
    FROM pg_database
    WHERE datistemplate = false
    ORDER BY datname
"#;

/// Raw server version string.
pub(super) const SERVER_VERSION: &str = "SELECT version()";

/// Installed extensions in the current database.
pub(super) const EXTENSIONS: &str = r#"
    SELECT extname::text AS extname
    FROM pg_extension
    ORDER BY extname
"#;

/// Tables and views outside the engine's own schemas.
pub(super) const LIST_TABLES: &str = r#"
    SELECT
        table_schema::text AS table_schema,
        table_name::text AS table_name
    FROM information_schema.tables
    WHERE table_schema NOT IN ('pg_catalog', 'information_schema')
    ORDER BY table_schema, table_name
"#;

/// Row estimate matched by schema and relation name. Binds `$1` schema, `$2` table.
pub(super) const ROW_ESTIMATE_QUALIFIED: &str = r#"
    SELECT c.reltuples::bigint AS estimate
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = $1
    AND c.relname = $2
"#;

/// Row estimate matched by bare relation name. Binds `$1` table.
pub(super) const ROW_ESTIMATE_BY_RELNAME: &str = r#"
    SELECT reltuples::bigint AS estimate
    FROM pg_class
    WHERE relname = $1
    LIMIT 1
"#;

/// Column definitions. Binds `$1` schema, `$2` table.
pub(super) const COLUMNS: &str = r#"
    SELECT
        column_name::text AS column_name,
        data_type::text AS data_type,
        is_nullable::text AS is_nullable,
        column_default::text AS column_default
    FROM information_schema.columns
    WHERE table_schema = $1
    AND table_name = $2
    ORDER BY ordinal_position
"#;

/// Primary key columns in key order. Binds `$1` schema, `$2` table.
pub(super) const PRIMARY_KEY: &str = r#"
    SELECT kcu.column_name::text AS column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
        ON tc.constraint_name = kcu.constraint_name
        AND tc.table_schema = kcu.table_schema
        AND tc.table_name = kcu.table_name
    WHERE tc.table_schema = $1
    AND tc.table_name = $2
    AND tc.constraint_type = 'PRIMARY KEY'
    ORDER BY kcu.ordinal_position
"#;

/// Raw index definitions. Binds `$1` schema, `$2` table.
pub(super) const INDEXES: &str = r#"
    SELECT indexdef::text AS indexdef
    FROM pg_indexes
    WHERE schemaname = $1
    AND tablename = $2
    ORDER BY indexname
"#;

/// Foreign key constraints with their definitions. Binds `$1` schema, `$2` table.
pub(super) const FOREIGN_KEYS: &str = r#"
    SELECT
        c.conname::text AS conname,
        pg_get_constraintdef(c.oid) AS definition
    FROM pg_constraint c
    JOIN pg_class cl ON cl.oid = c.conrelid
    JOIN pg_namespace n ON n.oid = cl.relnamespace
    WHERE c.contype = 'f'
    AND n.nspname = $1
    AND cl.relname = $2
    ORDER BY c.conname
"#;

/// Picks the row estimate query for a matching strategy.
pub(super) const fn row_estimate(strategy: RowEstimateMatch) -> &'static str {
    match strategy {
        RowEstimateMatch::SchemaQualified => ROW_ESTIMATE_QUALIFIED,
        RowEstimateMatch::RelationName => ROW_ESTIMATE_BY_RELNAME,
    }
}

/// Formats one foreign key the way the reports print it.
pub(super) fn format_foreign_key(constraint_name: &str, definition: &str) -> String {
    format!("{}: {}", constraint_name, definition)
}
