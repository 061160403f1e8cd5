use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("columns {missing:?} not found; available columns: {available:?}")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("expected {expected} values (one per row), got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("workbook {0} has no worksheets")]
    EmptyWorkbook(PathBuf),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
