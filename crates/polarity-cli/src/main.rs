mod classify;
mod display;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use polarity_ai::{AmbiguityPolicy, BatchConfig, DEFAULT_WORKERS};
use polarity_core::LabelVocabulary;
use polarity_llm::{DEFAULT_BASE_URL, OllamaClient};
use polarity_store::DEFAULT_SAMPLE_SEED;
use tracing::Level;

use crate::classify::{ClassifyOptions, run_classify_pipeline};

/// Run sentiment classification on a CSV or Excel file using an LLM.
#[derive(Parser)]
#[command(name = "polarity", version)]
struct Cli {
    /// Path to the input file (Excel workbook or CSV).
    #[arg(long)]
    file: PathBuf,

    /// Model to use for sentiment classification.
    #[arg(long, env = "POLARITY_MODEL", default_value = "mistral")]
    model: String,

    /// Comma-separated list of columns to analyse.
    #[arg(long, default_value = "title,quotes")]
    columns: String,

    /// Classification prompt text file. `{text}` marks where the record goes,
    /// `{choices}` expands to the label list.
    #[arg(long, env = "POLARITY_PROMPT", default_value = "prompt.txt")]
    prompt: PathBuf,

    /// Comma-separated sentiment choices (e.g. positive,negative,neutral).
    #[arg(long, default_value = "positive,negative,neutral,unrelated")]
    choices: String,

    /// Sample size for the dataset (0 disables sampling).
    #[arg(long, default_value_t = 1000)]
    sample: usize,

    /// Seed for row sampling.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SEED)]
    seed: u64,

    /// Maximum concurrent model invocations.
    #[arg(long, env = "POLARITY_WORKERS", default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Enable debug mode: verbose logs, Classification column, diagnostics file.
    #[arg(long)]
    debug: bool,

    /// Run the full analysis (default is sample only).
    #[arg(long)]
    full: bool,

    /// Run without saving results.
    #[arg(long)]
    dryrun: bool,

    /// Add the Classification column outside debug mode.
    #[arg(long)]
    resolve: bool,

    /// Resolve ambiguous replies to the earliest-declared matching label.
    #[arg(long)]
    prefer_first: bool,

    /// Directory for annotated output.
    #[arg(long, env = "POLARITY_OUTPUT_DIR", default_value = "temp_results")]
    output_dir: PathBuf,

    /// Base URL of the Ollama server.
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_BASE_URL)]
    ollama_url: String,

    /// Per-call timeout in seconds.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Sampling temperature passed to the model.
    #[arg(long)]
    temperature: Option<f32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("polarity v{}", env!("CARGO_PKG_VERSION"));

    let template = tokio::fs::read_to_string(&cli.prompt)
        .await
        .with_context(|| format!("reading prompt file {}", cli.prompt.display()))?;
    let vocabulary = LabelVocabulary::parse_list(&cli.choices).context("invalid --choices")?;
    let columns: Vec<String> = cli
        .columns
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    anyhow::ensure!(!columns.is_empty(), "--columns must name at least one column");

    let timeout = Duration::from_secs(cli.timeout_secs);
    let mut client = OllamaClient::new(cli.ollama_url.as_str(), timeout)?;
    if let Some(t) = cli.temperature {
        client = client.with_temperature(t);
    }

    let config = BatchConfig::new(cli.model.as_str(), template, vocabulary.clone())
        .with_workers(cli.workers)
        .with_debug(cli.debug)
        .with_call_timeout(Some(timeout));

    let opts = ClassifyOptions {
        columns,
        sample: (!cli.full && cli.sample > 0).then_some(cli.sample),
        seed: cli.seed,
        resolve: cli.resolve,
        policy: if cli.prefer_first {
            AmbiguityPolicy::FirstDeclared
        } else {
            AmbiguityPolicy::Unresolved
        },
        dry_run: cli.dryrun,
        output_dir: cli.output_dir,
    };

    let stats = run_classify_pipeline(Arc::new(client), &cli.file, &config, &opts).await?;
    display::print_summary(&stats, &vocabulary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_without_flags() {
        let cli = Cli::try_parse_from(["polarity", "--file", "data.csv"]).unwrap();
        assert_eq!(cli.columns, "title,quotes");
        assert_eq!(cli.choices, "positive,negative,neutral,unrelated");
        assert_eq!(cli.sample, 1000);
        assert_eq!(cli.workers, 4);
        assert!(!cli.full && !cli.dryrun && !cli.debug);
    }

    #[test]
    fn file_is_required() {
        assert!(Cli::try_parse_from(["polarity"]).is_err());
    }
}
