use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;
use wordfreq_chunker::SkippedFile;
use wordfreq_dispatcher::{FileReport, RunReport, RunStats};

pub fn render_text(report: &RunReport, elapsed: Duration) -> String {
    let mut out = String::new();
    for file in &report.files {
        let _ = writeln!(out, "File name: {}", file.path.display());
        let _ = writeln!(out, "Total number of words = {}", file.word_count);
        let _ = writeln!(
            out,
            "Number of words with at least two instances of the same consonant = {}",
            file.consonant_word_count
        );
        out.push('\n');
    }

    for skipped in &report.skipped {
        let _ = writeln!(
            out,
            "Skipped file: {} ({})",
            skipped.path.display(),
            skipped.reason
        );
    }
    if !report.skipped.is_empty() {
        out.push('\n');
    }

    let _ = writeln!(out, "Elapsed time = {:.6} s", elapsed.as_secs_f64());
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    skipped: &'a [SkippedFile],
    stats: &'a RunStats,
    elapsed_seconds: f64,
}

pub fn render_json(report: &RunReport, elapsed: Duration) -> Result<String> {
    let json = JsonReport {
        files: &report.files,
        skipped: &report.skipped,
        stats: &report.stats,
        elapsed_seconds: elapsed.as_secs_f64(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
