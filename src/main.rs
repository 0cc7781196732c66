use clap::Parser;
use linefold::config::derive_output_path;
use linefold::memory_budget::{auto_budget, DEFAULT_MEMORY_BUDGET_BYTES};
use linefold::{DedupConfig, DedupError, Deduplicator};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "linefold")]
#[command(about = "Remove duplicate lines from text files larger than memory", long_about = None)]
struct Cli {
    /// Text file to deduplicate
    input: PathBuf,
    /// Output file (default: <name>_deduplicated.<ext> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Bytes of distinct line data held in memory before spilling a chunk
    #[arg(long, conflicts_with = "auto_budget")]
    memory_budget: Option<u64>,
    /// Size the memory budget from currently available RAM
    #[arg(long)]
    auto_budget: bool,
    /// Keep chunk files after the run
    #[arg(long)]
    keep_temp: bool,
    /// Directory to create the run's temp workspace in
    #[arg(long)]
    temp_dir: Option<PathBuf>,
    /// Print a JSON run report to stdout
    #[arg(long)]
    report_json: bool,
}

fn main() -> Result<(), DedupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = cli
        .output
        .unwrap_or_else(|| derive_output_path(&cli.input));
    let budget = if cli.auto_budget {
        auto_budget()
    } else {
        cli.memory_budget.unwrap_or(DEFAULT_MEMORY_BUDGET_BYTES)
    };

    tracing::info!("[linefold] Input: {}", cli.input.display());
    tracing::info!("[linefold] Output will be saved to: {}", output.display());

    let mut config = DedupConfig::new(cli.input, output, budget)?
        .with_delete_temp_files(!cli.keep_temp);
    if let Some(dir) = cli.temp_dir {
        config = config.with_temp_root(dir);
    }

    let report = Deduplicator::new(config)?.deduplicate()?;

    if cli.report_json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!("[linefold] Could not serialize report: {}", e),
        }
    }

    Ok(())
}
