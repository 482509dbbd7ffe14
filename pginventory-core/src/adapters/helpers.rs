//! Helper utilities for SQL catalog adapters.

use crate::{Result, error::InventoryError};
use sqlx::{Row, postgres::PgRow};

/// SQLSTATE for `insufficient_privilege`.
pub const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Extension trait for extracting typed values from catalog rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use pginventory_core::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("column_name", Some("public.users"))?;
/// let default: Option<String> = row.get_field("column_default", None)?;
/// ```
pub trait RowExt {
    /// Extracts a typed field from the row with proper error context.
    ///
    /// # Arguments
    /// * `field_name` - Name of the column to extract
    /// * `table_context` - Optional table or catalog view for error messages
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>;
}

impl RowExt for PgRow {
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        self.try_get(field_name)
            .map_err(|e| InventoryError::parse_field(field_name, table_context, e))
    }
}

/// Maps a failed catalog query to an inventory error.
///
/// Permission denials become [`InventoryError::InsufficientPrivileges`];
/// everything else is a collection error carrying `context`.
pub fn map_query_error(error: sqlx::Error, context: String) -> InventoryError {
    match &error {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) => {
            InventoryError::insufficient_privileges(format!("{}: {}", context, db_err.message()))
        }
        _ => InventoryError::collection_failed(context, error),
    }
}
