//! Crate-wide error taxonomy.
//!
//! Per-filament failures (a filament whose attribute cannot be clustered)
//! are not errors: they are logged, the filament is dropped, and the batch
//! continues. Only whole-table structural problems and configuration
//! mistakes abort a run, and they do so before any output is written.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Class-agreement cutoff outside the valid range.
    #[error("class-agreement cutoff must lie in [0, 1], got {value}")]
    InvalidCutoff { value: f64 },

    /// A required attribute is absent from the input table.
    #[error("required column `{column}` is missing from the input table")]
    MissingColumn { column: &'static str },

    /// Cooperative cancellation was observed before the run completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Reference source/sink failure.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reference source/sink produced or received a malformed document.
    #[error("malformed table document {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
