//! Error types for catalog processing

use std::path::PathBuf;
use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while loading, matching, merging or averaging catalogs
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Empty batch: {0}")]
    EmptyBatch(String),

    #[error("Catalog '{catalog}' is missing column '{column}'")]
    MissingColumn { catalog: String, column: String },

    #[error("Column '{column}' of catalog '{catalog}' is not numeric")]
    NonNumericColumn { catalog: String, column: String },

    #[error("Catalog '{catalog}' row {row} has invalid coordinates (RA={ra}, Dec={dec})")]
    InvalidCoordinate {
        catalog: String,
        row: usize,
        ra: f64,
        dec: f64,
    },

    #[error("Schema mismatch between '{expected_source}' [{expected}] and '{found_source}' [{found}]")]
    SchemaMismatch {
        expected_source: String,
        expected: String,
        found_source: String,
        found: String,
    },

    #[error("Column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("Output directory {path:?} unavailable: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl From<glob::GlobError> for CatalogError {
    fn from(err: glob::GlobError) -> Self {
        CatalogError::Io(err.into())
    }
}
