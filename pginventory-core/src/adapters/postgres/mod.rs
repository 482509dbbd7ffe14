//! PostgreSQL catalog adapter.
//!
//! # Security
//! - Sessions run with `default_transaction_read_only = on`
//! - Only system catalogs and `information_schema` are queried
//! - Credentials never appear in errors or logs
//!
//! # Module Structure
//! - `connection`: connector and per-database pool setup
//! - `queries`: catalog SQL

mod connection;
mod queries;


pub use connection::PgConnector;

use crate::Result;
use crate::adapters::helpers::{RowExt, map_query_error};
use crate::adapters::{CatalogSource, RowEstimateMatch};
use crate::models::{ColumnInfo, TableRef};
use async_trait::async_trait;
use sqlx::PgPool;

/// A catalog connection to one PostgreSQL database.
pub struct PgCatalog {
    pool: PgPool,
    server: String,
    database: String,
    row_estimate_match: RowEstimateMatch,
}

impl std::fmt::Debug for PgCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCatalog")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("row_estimate_match", &self.row_estimate_match)
            .finish_non_exhaustive()
    }
}

impl PgCatalog {
    pub(crate) fn new(
        pool: PgPool,
        server: impl Into<String>,
        database: impl Into<String>,
        row_estimate_match: RowEstimateMatch,
    ) -> Self {
        Self {
            pool,
            server: server.into(),
            database: database.into(),
            row_estimate_match,
        }
    }

    fn context(&self, what: &str) -> String {
        format!("{} in database '{}' on {}", what, self.database, self.server)
    }

    async fn fetch_strings(&self, sql: &'static str, table: &TableRef, what: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(sql)
            .bind(&table.schema)
            .bind(&table.table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_query_error(e, self.context(&format!("{} of {}", what, table))))
    }
}

#[async_trait]
impl CatalogSource for PgCatalog {
    async fn server_version(&self) -> Result<String> {
        sqlx::query_scalar::<_, String>(queries::SERVER_VERSION)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_query_error(e, self.context("server version")))
    }

    async fn extensions(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(queries::EXTENSIONS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_query_error(e, self.context("extensions")))
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        let databases = sqlx::query_scalar::<_, String>(queries::LIST_DATABASES)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_query_error(e, format!("database listing on {}", self.server)))?;

        tracing::debug!("Found {} databases on {}", databases.len(), self.server);
        Ok(databases)
    }

    async fn list_tables(&self) -> Result<Vec<TableRef>> {
        let rows = sqlx::query(queries::LIST_TABLES)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_query_error(e, self.context("table listing")))?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let schema: String = row.get_field("table_schema", Some("information_schema.tables"))?;
            let table: String = row.get_field("table_name", Some("information_schema.tables"))?;
            tables.push(TableRef::new(schema, table));
        }

        tracing::debug!(
            "Found {} tables in database '{}' on {}",
            tables.len(),
            self.database,
            self.server
        );
        Ok(tables)
    }

    async fn estimated_row_count(&self, table: &TableRef) -> Result<i64> {
        let query = sqlx::query_scalar::<_, i64>(queries::row_estimate(self.row_estimate_match));
        let query = match self.row_estimate_match {
            RowEstimateMatch::SchemaQualified => query.bind(&table.schema).bind(&table.table),
            RowEstimateMatch::RelationName => query.bind(&table.table),
        };

        let estimate = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_query_error(e, self.context(&format!("row estimate of {}", table))))?;

        Ok(estimate.unwrap_or_else(|| {
            tracing::debug!("No pg_class entry for {}, using row estimate 0", table);
            0
        }))
    }

    async fn columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>> {
        let rows = sqlx::query(queries::COLUMNS)
            .bind(&table.schema)
            .bind(&table.table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_query_error(e, self.context(&format!("columns of {}", table))))?;

        let qualified = table.to_string();
        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.get_field("column_name", Some(&qualified))?;
            let data_type: String = row.get_field("data_type", Some(&qualified))?;
            let is_nullable: String = row.get_field("is_nullable", Some(&qualified))?;
            let default: Option<String> = row.get_field("column_default", Some(&qualified))?;

            columns.push(ColumnInfo::new(name, data_type, is_nullable == "YES", default));
        }

        Ok(columns)
    }

    async fn primary_key(&self, table: &TableRef) -> Result<Vec<String>> {
        self.fetch_strings(queries::PRIMARY_KEY, table, "primary key").await
    }

    async fn indexes(&self, table: &TableRef) -> Result<Vec<String>> {
        self.fetch_strings(queries::INDEXES, table, "indexes").await
    }

    async fn foreign_keys(&self, table: &TableRef) -> Result<Vec<String>> {
        let rows = sqlx::query(queries::FOREIGN_KEYS)
            .bind(&table.schema)
            .bind(&table.table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_query_error(e, self.context(&format!("foreign keys of {}", table))))?;

        let qualified = table.to_string();
        let mut foreign_keys = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.get_field("conname", Some(&qualified))?;
            let definition: String = row.get_field("definition", Some(&qualified))?;
            foreign_keys.push(queries::format_foreign_key(&name, &definition));
        }

        Ok(foreign_keys)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
