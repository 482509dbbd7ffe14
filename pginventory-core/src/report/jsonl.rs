//! Line-delimited JSON rendering.

use crate::models::TableRecord;
use crate::{Result, error::InventoryError};

/// Renders one compact JSON object per record, each terminated by `\n`.
///
/// # Errors
/// Returns a serialization error naming the record that failed to encode.
pub fn render_jsonl(records: &[TableRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        let line = serde_json::to_string(record).map_err(|e| InventoryError::Serialization {
            context: format!(
                "record for {} in database '{}' on {}",
                record.qualified_name(),
                record.database,
                record.server
            ),
            source: e,
        })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}
