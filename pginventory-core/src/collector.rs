//! Metadata collection for one database.
//!
//! Database-level facts are read once and shared by every record. Each
//! table is introspected independently: a failing table becomes a
//! table-scoped [`ScanFailure`] and collection moves on to the next one.

use crate::Result;
use crate::adapters::CatalogSource;
use crate::models::{
    DatabaseCollection, DatabaseFacts, FailureScope, ScanFailure, TableDetails, TableRecord,
    TableRef,
};
use crate::reporter::InventoryReporter;

/// Collects one record per table of the database behind `source`.
///
/// # Errors
/// Returns an error if the version, extension or table listing query fails.
/// Per-table failures are isolated into [`DatabaseCollection::failures`].
pub async fn collect_database(
    source: &dyn CatalogSource,
    server: &str,
    database: &str,
    reporter: &dyn InventoryReporter,
) -> Result<DatabaseCollection> {
    let postgres_version = source.server_version().await?;
    let extensions = source.extensions().await?.into_iter().collect();
    let facts = DatabaseFacts {
        server: server.to_string(),
        database: database.to_string(),
        postgres_version,
        extensions,
    };

    let tables = source.list_tables().await?;
    tracing::debug!(
        "Collecting {} tables from database '{}' on {}",
        tables.len(),
        database,
        server
    );

    let mut collection = DatabaseCollection::default();
    for table in tables {
        let result = collect_table(source, &table)
            .await
            .and_then(|details| TableRecord::new(&facts, table.clone(), details));

        match result {
            Ok(record) => collection.records.push(record),
            Err(e) => {
                let failure = ScanFailure::from_error(
                    server,
                    FailureScope::Table {
                        database: database.to_string(),
                        schema: table.schema,
                        table: table.table,
                    },
                    &e,
                );
                reporter.failure(&failure);
                collection.failures.push(failure);
            }
        }
    }

    Ok(collection)
}

/// Runs the per-table introspection queries.
async fn collect_table(source: &dyn CatalogSource, table: &TableRef) -> Result<TableDetails> {
    tracing::trace!("Introspecting {}", table);

    Ok(TableDetails {
        rowcount: source.estimated_row_count(table).await?,
        columns: source.columns(table).await?,
        primary_keys: source.primary_key(table).await?,
        indexes: source.indexes(table).await?,
        foreign_keys: source.foreign_keys(table).await?,
    })
}
