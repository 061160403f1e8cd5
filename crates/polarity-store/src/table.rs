//! Tabular record source: CSV or Excel in, one combined text per row out.
//!
//! Every column is read as UTF-8 regardless of what the values look like, so
//! numeric or date columns concatenate exactly as they appear in the file.

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, LargeStringArray, StringArray, UInt32Array};
use arrow::compute::{concat_batches, take_record_batch};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use calamine::{Data, Reader, open_workbook_auto};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::StoreError;

/// Seed used for row sampling unless the caller picks another.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// An in-memory table of string columns loaded from a file.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
    source_name: String,
}

impl Table {
    /// Wrap an existing batch. `source_name` is used for output file naming.
    pub fn new(batch: RecordBatch, source_name: impl Into<String>) -> Self {
        Self {
            batch,
            source_name: source_name.into(),
        }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// File name (without directory) the table was loaded from.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Fail with [`StoreError::MissingColumns`] unless every named column exists.
    pub fn check_columns<S: AsRef<str>>(&self, columns: &[S]) -> Result<(), StoreError> {
        let schema = self.batch.schema();
        let missing: Vec<String> = columns
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| schema.index_of(c).is_err())
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(StoreError::MissingColumns {
                missing,
                available: self.column_names(),
            })
        }
    }

    /// Join the selected columns of each row with a single space.
    ///
    /// Fails if any selected column is absent; nulls contribute an empty string.
    pub fn combined_text<S: AsRef<str>>(&self, columns: &[S]) -> Result<Vec<String>, StoreError> {
        self.check_columns(columns)?;

        let selected: Vec<&dyn Array> = columns
            .iter()
            .filter_map(|c| self.batch.column_by_name(c.as_ref()))
            .map(|col| col.as_ref())
            .collect();

        Ok((0..self.batch.num_rows())
            .map(|row| {
                selected
                    .iter()
                    .map(|col| get_string(*col, row).unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect())
    }

    /// Keep a seeded random subset of `n` rows, in their original order.
    ///
    /// Returns the table unchanged when `n` is not smaller than the row count.
    pub fn sample(self, n: usize, seed: u64) -> Result<Self, StoreError> {
        let total = self.batch.num_rows();
        if n >= total {
            return Ok(self);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked = rand::seq::index::sample(&mut rng, total, n).into_vec();
        picked.sort_unstable();

        let indices = UInt32Array::from(picked.into_iter().map(|i| i as u32).collect::<Vec<_>>());
        let batch = take_record_batch(&self.batch, &indices)?;
        info!(sampled = n, total, seed, "sampled rows");

        Ok(Self {
            batch,
            source_name: self.source_name,
        })
    }
}

/// Read a CSV file with a header row into a [`Table`] of `Utf8` columns.
pub fn read_csv(path: &Path) -> Result<Table, StoreError> {
    if !path.exists() {
        return Err(StoreError::FileNotFound(path.to_path_buf()));
    }

    let mut file = File::open(path)?;
    let format = Format::default().with_header(true);
    let (inferred, _) = format.infer_schema(&mut file, Some(1))?;
    file.rewind()?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(file)?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;

    info!(
        path = %path.display(),
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "loaded csv"
    );
    Ok(Table::new(batch, source_name(path)))
}

/// Read the first worksheet of an Excel workbook into a [`Table`] of `Utf8` columns.
///
/// The first row is the header. Empty cells become nulls; numbers, booleans and
/// dates are rendered as text.
pub fn read_excel(path: &Path) -> Result<Table, StoreError> {
    if !path.exists() {
        return Err(StoreError::FileNotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| StoreError::EmptyWorkbook(path.to_path_buf()))??;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
        .unwrap_or_default();

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
    for cells in rows {
        for (i, column) in columns.iter_mut().enumerate() {
            column.push(cells.get(i).and_then(cell_text));
        }
    }

    let fields: Vec<Field> = header
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|values| Arc::new(StringArray::from(values)) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema, arrays)?;

    info!(
        path = %path.display(),
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "loaded workbook"
    );
    Ok(Table::new(batch, source_name(path)))
}

/// Load a record file, trying it as an Excel workbook first and as CSV second.
pub fn read_table(path: &Path) -> Result<Table, StoreError> {
    match read_excel(path) {
        Err(StoreError::Excel(e)) => {
            warn!(path = %path.display(), error = %e, "not a workbook, reading as csv");
            read_csv(path)
        }
        other => other,
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string())
}

/// Extract a string value from an Arrow array (handles Utf8 and LargeUtf8).
fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}
