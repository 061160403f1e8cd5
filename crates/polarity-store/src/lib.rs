//! Tabular I/O around the classification engine: CSV or Excel records in,
//! annotated CSV out.

mod error;
pub use error::StoreError;

pub mod output;
pub mod table;

pub use output::{
    CLASSIFICATION_COLUMN, SENTIMENT_COLUMN, annotate, write_annotated_csv, write_diagnostics,
};
pub use table::{DEFAULT_SAMPLE_SEED, Table, read_csv, read_excel, read_table};
