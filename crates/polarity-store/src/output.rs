//! Annotated output: the loaded table plus per-row model responses and labels.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use polarity_core::{BatchResult, ItemDiagnostics, RawResponse, ResolvedLabel};
use serde::Serialize;
use tracing::info;

use crate::StoreError;
use crate::table::Table;

/// Column holding the raw model response for each row.
pub const SENTIMENT_COLUMN: &str = "Sentiment";
/// Column holding the resolved label for each row.
pub const CLASSIFICATION_COLUMN: &str = "Classification";

/// Append `Sentiment` (and optionally `Classification`) columns to the table.
///
/// Both sequences must have one entry per table row.
pub fn annotate<'a>(
    table: &Table,
    responses: impl ExactSizeIterator<Item = &'a RawResponse>,
    labels: Option<&[ResolvedLabel]>,
) -> Result<RecordBatch, StoreError> {
    let batch = table.batch();
    let rows = batch.num_rows();

    if responses.len() != rows {
        return Err(StoreError::LengthMismatch {
            expected: rows,
            actual: responses.len(),
        });
    }

    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();

    fields.push(Field::new(SENTIMENT_COLUMN, DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from(
        responses.map(|r| r.to_string()).collect::<Vec<_>>(),
    )));

    if let Some(labels) = labels {
        if labels.len() != rows {
            return Err(StoreError::LengthMismatch {
                expected: rows,
                actual: labels.len(),
            });
        }
        fields.push(Field::new(CLASSIFICATION_COLUMN, DataType::Utf8, false));
        columns.push(Arc::new(StringArray::from(
            labels.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
        )));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Write an annotated batch as `annotated_{source_name}_{uuid}.csv` inside `dir`.
///
/// `dir` must already exist; creating it is the caller's job.
pub fn write_annotated_csv(
    batch: &RecordBatch,
    dir: &Path,
    source_name: &str,
) -> Result<PathBuf, StoreError> {
    let path = dir.join(format!("annotated_{source_name}_{}.csv", uuid::Uuid::new_v4()));
    let file = File::create(&path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(batch)?;

    info!(path = %path.display(), rows = batch.num_rows(), "wrote annotated csv");
    Ok(path)
}

#[derive(Serialize)]
struct DiagnosticsLine<'a> {
    row: usize,
    response: &'a RawResponse,
    #[serde(flatten)]
    diagnostics: &'a ItemDiagnostics,
}

/// Write one JSON line per row that carries debug diagnostics.
///
/// Returns the number of lines written.
pub fn write_diagnostics(result: &BatchResult, path: &Path) -> Result<usize, StoreError> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut written = 0usize;

    for (row, item) in result.iter().enumerate() {
        let Some(diagnostics) = &item.diagnostics else {
            continue;
        };
        let line = DiagnosticsLine {
            row,
            response: &item.response,
            diagnostics,
        };
        serde_json::to_writer(&mut out, &line)?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;

    info!(path = %path.display(), lines = written, "wrote diagnostics");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polarity_core::ItemOutcome;

    fn table() -> Table {
        let schema = Arc::new(Schema::new(vec![Field::new("title", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["good", "bad"]))],
        )
        .unwrap();
        Table::new(batch, "reviews.csv")
    }

    fn responses() -> Vec<RawResponse> {
        vec![
            RawResponse::Reply("Positive.".into()),
            RawResponse::Failed("timed out after 120s".into()),
        ]
    }

    fn column<'b>(batch: &'b RecordBatch, name: &str) -> &'b StringArray {
        batch
            .column_by_name(name)
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
    }

    #[test]
    fn appends_sentiment_column() {
        let r = responses();
        let batch = annotate(&table(), r.iter(), None).unwrap();

        assert_eq!(batch.num_columns(), 2);
        let sentiment = column(&batch, SENTIMENT_COLUMN);
        assert_eq!(sentiment.value(0), "Positive.");
        assert_eq!(sentiment.value(1), "ERROR: timed out after 120s");
        assert!(batch.column_by_name(CLASSIFICATION_COLUMN).is_none());
    }

    #[test]
    fn appends_classification_column() {
        let r = responses();
        let labels = vec![ResolvedLabel::Label("positive".into()), ResolvedLabel::Unresolved];
        let batch = annotate(&table(), r.iter(), Some(&labels)).unwrap();

        let classification = column(&batch, CLASSIFICATION_COLUMN);
        assert_eq!(classification.value(0), "positive");
        assert_eq!(classification.value(1), "unresolved");
    }

    #[test]
    fn rejects_misaligned_responses() {
        let r = vec![RawResponse::Reply("x".into())];
        let err = annotate(&table(), r.iter(), None).unwrap_err();
        assert!(matches!(
            err,
            StoreError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn writes_csv_with_header_and_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let r = responses();
        let batch = annotate(&table(), r.iter(), None).unwrap();

        let path = write_annotated_csv(&batch, dir.path(), "reviews.csv").unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("annotated_reviews.csv_"));
        assert!(name.ends_with(".csv"));

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("title,Sentiment"));
        assert_eq!(lines.next(), Some("good,Positive."));
        assert_eq!(lines.next(), Some("bad,ERROR: timed out after 120s"));
    }

    #[test]
    fn two_writes_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let r = responses();
        let batch = annotate(&table(), r.iter(), None).unwrap();

        let a = write_annotated_csv(&batch, dir.path(), "reviews.csv").unwrap();
        let b = write_annotated_csv(&batch, dir.path(), "reviews.csv").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn diagnostics_written_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diag.jsonl");
        let result = BatchResult::new(vec![
            ItemOutcome {
                response: RawResponse::Reply("neutral".into()),
                diagnostics: Some(ItemDiagnostics {
                    prompt: "p0".into(),
                    latency_ms: 12,
                    error: None,
                }),
            },
            ItemOutcome {
                response: RawResponse::Reply("ignored".into()),
                diagnostics: None,
            },
            ItemOutcome {
                response: RawResponse::Failed("boom".into()),
                diagnostics: Some(ItemDiagnostics {
                    prompt: "p2".into(),
                    latency_ms: 3,
                    error: Some("boom".into()),
                }),
            },
        ]);

        let written = write_diagnostics(&result, &path).unwrap();
        assert_eq!(written, 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["row"], 0);
        assert_eq!(lines[0]["prompt"], "p0");
        assert_eq!(lines[0]["response"]["kind"], "reply");
        assert_eq!(lines[1]["row"], 2);
        assert_eq!(lines[1]["error"], "boom");
        assert_eq!(lines[1]["latency_ms"], 3);
    }
}
