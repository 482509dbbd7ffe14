//! Report files.
//!
//! Two files with fixed names are written into the output directory and
//! overwritten on every run:
//! - `postgres_inventory.jsonl`: one JSON record per line
//! - `postgres_inventory.md`: one Markdown section per record
//!
//! Both are rendered from the records in their iteration order, so the same
//! input always produces byte-identical files.

mod jsonl;
mod markdown;

pub use jsonl::render_jsonl;
pub use markdown::render_markdown;

use crate::models::TableRecord;
use crate::{Result, error::InventoryError};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// File name of the line-delimited report.
pub const JSONL_FILE_NAME: &str = "postgres_inventory.jsonl";

/// File name of the Markdown report.
pub const MARKDOWN_FILE_NAME: &str = "postgres_inventory.md";

/// Paths of the files written by [`write_reports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// Line-delimited JSON report
    pub jsonl: PathBuf,
    /// Markdown report
    pub markdown: PathBuf,
    /// When the reports were generated; not part of the file names
    pub generated_at: DateTime<Utc>,
}

/// Writes both reports into `output_dir`, creating it if needed.
///
/// The JSONL file is written first. If writing the Markdown file fails, the
/// JSONL file is left in place.
///
/// # Errors
/// Returns an I/O error if the directory cannot be created or either file
/// cannot be written, and a serialization error if a record cannot be
/// encoded.
pub async fn write_reports(output_dir: &Path, records: &[TableRecord]) -> Result<ReportPaths> {
    let generated_at = Utc::now();

    tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
        InventoryError::io(
            format!("Failed to create output directory {}", output_dir.display()),
            e,
        )
    })?;

    let jsonl = output_dir.join(JSONL_FILE_NAME);
    write_file(&jsonl, render_jsonl(records)?).await?;

    let markdown = output_dir.join(MARKDOWN_FILE_NAME);
    let rendered = render_markdown(records).map_err(|e| {
        InventoryError::io(
            format!("Failed to render {}", markdown.display()),
            std::io::Error::other(e),
        )
    })?;
    write_file(&markdown, rendered).await?;

    tracing::info!(
        "Wrote {} records to {} and {} (generated at {})",
        records.len(),
        jsonl.display(),
        markdown.display(),
        generated_at.to_rfc3339()
    );

    Ok(ReportPaths {
        jsonl,
        markdown,
        generated_at,
    })
}

async fn write_file(path: &Path, contents: String) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| InventoryError::io(format!("Failed to write to {}", path.display()), e))
}
