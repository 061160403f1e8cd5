//! Classification pipeline: reads CSV or Excel records, asks the model, writes annotated CSV.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use polarity_ai::{AmbiguityPolicy, BatchConfig, ModelInvoker, classify_batch, resolve_batch};
use polarity_core::ResolvedLabel;
use polarity_store::{
    DEFAULT_SAMPLE_SEED, annotate, read_table, write_annotated_csv, write_diagnostics,
};

/// Pipeline settings outside the engine's own [`BatchConfig`].
pub struct ClassifyOptions {
    pub columns: Vec<String>,
    /// Row budget; `None` classifies every row.
    pub sample: Option<usize>,
    pub seed: u64,
    /// Add a `Classification` column even outside debug mode.
    pub resolve: bool,
    pub policy: AmbiguityPolicy,
    pub dry_run: bool,
    pub output_dir: PathBuf,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            columns: vec!["title".into(), "quotes".into()],
            sample: Some(1000),
            seed: DEFAULT_SAMPLE_SEED,
            resolve: false,
            policy: AmbiguityPolicy::default(),
            dry_run: false,
            output_dir: PathBuf::from("temp_results"),
        }
    }
}

pub struct ClassifyStats {
    pub total_rows: usize,
    pub classified: usize,
    pub failed: usize,
    /// Resolved label per classified row, in row order.
    pub labels: Vec<ResolvedLabel>,
    pub output: Option<PathBuf>,
    pub diagnostics: Option<PathBuf>,
    pub elapsed_secs: f64,
}

/// Run the full pipeline: load table → sample → combine columns → classify → write.
pub async fn run_classify_pipeline(
    invoker: Arc<dyn ModelInvoker>,
    input: &Path,
    config: &BatchConfig,
    opts: &ClassifyOptions,
) -> anyhow::Result<ClassifyStats> {
    let start = Instant::now();

    // 1. Load source rows.
    let table = read_table(input).with_context(|| format!("reading {}", input.display()))?;
    let total_rows = table.num_rows();
    eprintln!("  Read {total_rows} rows from {}", input.display());

    // 2. Check columns before sampling so the error lists the full header.
    table
        .check_columns(&opts.columns)
        .context("selecting text columns")?;

    // 3. Optional sampling.
    let table = match opts.sample {
        Some(n) if n > 0 => table.sample(n, opts.seed).context("sampling rows")?,
        _ => table,
    };
    let records = table.combined_text(&opts.columns)?;

    // 4. Classify.
    eprintln!(
        "  Classifying {} records with {} ({} workers)...",
        records.len(),
        config.model,
        config.worker_limit()
    );
    let result = classify_batch(invoker, &records, config)
        .await
        .context("invalid classification settings")?;
    let labels = resolve_batch(&result, &config.vocabulary, opts.policy);

    // 5. Persist unless this is a dry run.
    let mut output = None;
    let mut diagnostics = None;
    if !opts.dry_run {
        std::fs::create_dir_all(&opts.output_dir)
            .with_context(|| format!("creating {}", opts.output_dir.display()))?;

        let with_labels = config.debug || opts.resolve;
        let annotated = annotate(
            &table,
            result.responses(),
            with_labels.then_some(labels.as_slice()),
        )?;
        output = Some(write_annotated_csv(
            &annotated,
            &opts.output_dir,
            table.source_name(),
        )?);

        if config.debug {
            let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
            let path = opts
                .output_dir
                .join(format!("diagnostics_{}_{stamp}.jsonl", table.source_name()));
            write_diagnostics(&result, &path).context("writing diagnostics")?;
            diagnostics = Some(path);
        }
    }

    Ok(ClassifyStats {
        total_rows,
        classified: result.len(),
        failed: result.failed_count(),
        labels,
        output,
        diagnostics,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}
