//! Run summary: counts, timings, and the label distribution.

use polarity_core::{LabelVocabulary, ResolvedLabel, UNRESOLVED};

use crate::classify::ClassifyStats;

/// Count resolved labels in vocabulary order, with `unresolved` last.
pub fn label_distribution(
    labels: &[ResolvedLabel],
    vocabulary: &LabelVocabulary,
) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = vocabulary
        .iter()
        .map(|l| (l.as_str().to_string(), 0))
        .collect();
    let mut unresolved = 0usize;

    for label in labels {
        match label {
            ResolvedLabel::Label(name) => {
                if let Some(entry) = counts.iter_mut().find(|(n, _)| n == name) {
                    entry.1 += 1;
                }
            }
            ResolvedLabel::Unresolved => unresolved += 1,
        }
    }

    counts.push((UNRESOLVED.to_string(), unresolved));
    counts
}

pub fn print_summary(stats: &ClassifyStats, vocabulary: &LabelVocabulary) {
    println!("=== Classification summary ===");
    println!("  {:<26} {}", "rows in file", stats.total_rows);
    println!("  {:<26} {}", "rows classified", stats.classified);
    println!("  {:<26} {}", "failed invocations", stats.failed);
    println!("  {:<26} {:.1}s", "elapsed", stats.elapsed_secs);
    println!();

    println!("Labels");
    let total = stats.labels.len().max(1) as f64;
    for (label, count) in label_distribution(&stats.labels, vocabulary) {
        println!(
            "  {:<26} {:>6}  ({:.1}%)",
            label,
            count,
            count as f64 / total * 100.0
        );
    }
    println!();

    match &stats.output {
        Some(path) => println!("Output saved to: {}", path.display()),
        None => println!("Dry run: no output written."),
    }
    if let Some(path) = &stats.diagnostics {
        println!("Diagnostics saved to: {}", path.display());
    }
}
