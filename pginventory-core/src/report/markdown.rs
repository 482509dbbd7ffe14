//! Markdown rendering.

use crate::models::TableRecord;
use std::fmt::{self, Write as _};

/// Renders one section per record, separated by horizontal rules.
///
/// The primary key line and the index and foreign key subsections are
/// omitted when empty; the columns table is always present.
///
/// # Errors
/// Propagates a formatting error from the underlying writer.
pub fn render_markdown(records: &[TableRecord]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for record in records {
        render_record(&mut out, record)?;
    }
    Ok(out)
}

fn render_record(out: &mut String, record: &TableRecord) -> fmt::Result {
    let extensions: Vec<&str> = record.extensions.iter().map(String::as_str).collect();

    writeln!(
        out,
        "## {} · {} · {}.{}\n",
        record.server, record.database, record.schema, record.table
    )?;
    writeln!(out, "- PostgreSQL Version: {}", record.postgres_version)?;
    writeln!(out, "- Extensions: {}", extensions.join(", "))?;
    writeln!(out, "- Rowcount: {}", record.rowcount)?;
    if !record.primary_keys.is_empty() {
        writeln!(out, "- Primary Key: {}", record.primary_keys.join(", "))?;
    }

    out.push_str("\n### Columns\n\n");
    out.push_str("| Name | Type | Nullable | Default |\n");
    out.push_str("|------|------|----------|---------|\n");
    for column in &record.columns {
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            column.name,
            column.data_type,
            column.nullable_label(),
            column.default.as_deref().unwrap_or("")
        )?;
    }

    if !record.indexes.is_empty() {
        out.push_str("\n### Indexes\n");
        for index in &record.indexes {
            writeln!(out, "- {}", index)?;
        }
    }

    if !record.foreign_keys.is_empty() {
        out.push_str("\n### Foreign Keys\n");
        for foreign_key in &record.foreign_keys {
            writeln!(out, "- {}", foreign_key)?;
        }
    }

    out.push_str("\n---\n\n");
    Ok(())
}
