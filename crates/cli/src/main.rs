use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use wordfreq_chunker::{FileSet, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use wordfreq_dispatcher::{
    run_local, run_spawned, serve_stdio_worker, DispatchConfig, WorkerCommand,
};

mod report;

#[derive(Parser, Debug)]
#[command(name = "wordfreq")]
#[command(about = "Count words and consonant-repeat words across files with parallel workers", long_about = None)]
#[command(version)]
struct Cli {
    /// Chunk size in bytes
    #[arg(short = 's', long = "chunk-size", default_value_t = DEFAULT_CHUNK_SIZE, value_parser = parse_chunk_size)]
    chunk_size: usize,

    /// Total processes, dispatcher included (overrides WORDFREQ_PROCESSES)
    #[arg(short = 'n', long)]
    processes: Option<usize>,

    /// Reply deadline per chunk in milliseconds (overrides WORDFREQ_REPLY_TIMEOUT_MS)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Run every worker as a child process instead of an in-process task
    #[arg(long)]
    spawn: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long)]
    quiet: bool,

    /// Serve as a worker over stdin/stdout (used by --spawn)
    #[arg(long, hide = true)]
    worker: bool,

    /// Input files, reported in this order
    #[arg(required_unless_present = "worker")]
    files: Vec<PathBuf>,
}

fn parse_chunk_size(raw: &str) -> Result<usize, String> {
    let size: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a positive integer"))?;
    if size == 0 {
        return Err("chunk size must be a positive integer".to_string());
    }
    if size > MAX_CHUNK_SIZE {
        return Err(format!("chunk size cannot exceed {MAX_CHUNK_SIZE}"));
    }
    Ok(size)
}

#[tokio::main]
async fn main() {
    let mut cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not failures.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    // Keep stdout clean for JSON parsing
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let outcome = if cli.worker {
        serve_stdio_worker().await.map(|_| ()).context("Worker failed")
    } else {
        run(&cli).await
    };

    if let Err(err) = outcome {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let started = Instant::now();

    let mut config = DispatchConfig::from_env().with_chunk_size(cli.chunk_size);
    if let Some(processes) = cli.processes {
        config = config.with_processes(processes);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_reply_timeout(Duration::from_millis(timeout_ms));
    }

    let (files, skipped) = FileSet::probe(&cli.files);
    log::info!(
        "{} of {} files readable, {} processes",
        files.len(),
        cli.files.len(),
        config.processes
    );

    let outcome = if cli.spawn {
        let program = std::env::current_exe().context("Failed to locate the wordfreq binary")?;
        let mut command = WorkerCommand::new(program).arg("--worker");
        if cli.quiet {
            command = command.arg("--quiet");
        } else if cli.verbose {
            command = command.arg("--verbose");
        }
        run_spawned(files, skipped, &config, &command).await
    } else {
        run_local(files, skipped, &config).await
    };
    let report = outcome.context("Word count failed")?;

    let elapsed = started.elapsed();
    let rendered = if cli.json {
        report::render_json(&report, elapsed)?
    } else {
        report::render_text(&report, elapsed)
    };
    print!("{rendered}");

    log::debug!(
        "{} rounds, {} chunks, {} bytes dispatched, {} bytes re-read",
        report.stats.rounds,
        report.stats.chunks_dispatched,
        report.stats.bytes_dispatched,
        report.stats.bytes_trimmed
    );
    Ok(())
}
