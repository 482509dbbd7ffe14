//! Run-level configuration for an inventory pass.

use std::path::PathBuf;

/// Default output directory for the report files.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Controls how servers are scanned and where reports go.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Scan servers concurrently.
    ///
    /// When false, servers are scanned one after another in input order.
    /// Default: true
    pub parallel: bool,

    /// Maximum number of servers scanned at once in parallel mode.
    ///
    /// Default: 4
    pub max_concurrency: usize,

    /// Directory receiving `postgres_inventory.jsonl` and `postgres_inventory.md`.
    pub output_dir: PathBuf,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_concurrency: 4,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl InventoryConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to scan servers concurrently.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the maximum concurrency.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1); // Ensure at least 1
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns a configuration error for an empty output path.
    pub fn validate(&self) -> crate::Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(crate::error::InventoryError::configuration(
                "output_dir cannot be empty",
            ));
        }
        Ok(())
    }
}
