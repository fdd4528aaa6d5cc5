//! Snowline main entry point
//!
//! This is the command-line interface for the Snowline snow-report pipeline.

use clap::Parser;
use snowline::config::load_config;
use snowline::pipeline::{load_source_urls, run_pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Snowline: a batched snow-report acquisition pipeline
///
/// Snowline fetches ski-resort report pages, extracts structured snow facts
/// through a completion backend, and upserts one current record per resort
/// into a hosted table store.
#[derive(Parser, Debug)]
#[command(name = "snowline")]
#[command(version = "1.0.0")]
#[command(about = "Fetch, extract, and store ski resort snow reports", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be processed without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(());
    }

    let summary = run_pipeline(config).await?;
    tracing::info!(
        "{} of {} URLs produced reports that were saved",
        summary.reports_saved,
        summary.total_urls
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("snowline=info,warn"),
            1 => EnvFilter::new("snowline=debug,info"),
            2 => EnvFilter::new("snowline=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &snowline::config::Config) -> anyhow::Result<()> {
    println!("=== Snowline Dry Run ===\n");

    println!("Pipeline:");
    println!("  Batch size: {}", config.pipeline.batch_size);
    println!(
        "  Extraction sub-batch size: {}",
        config.pipeline.extract_batch_size
    );
    println!(
        "  Extraction pause: {}ms",
        config.pipeline.extract_pause_ms
    );
    println!("  Batch pause: {}ms", config.pipeline.batch_pause_ms);

    println!("\nExtractor:");
    println!("  Endpoint: {}", config.extractor.endpoint);
    println!("  Model: {}", config.extractor.model);
    println!("  API key from: ${}", config.extractor.api_key_env);

    println!("\nStore:");
    println!("  Endpoint: {}", config.store.endpoint);
    println!("  Table: {}", config.store.table);
    println!("  API key from: ${}", config.store.api_key_env);

    let urls = load_source_urls(std::path::Path::new(&config.input.urls_path))?;
    let batches = urls.len().div_ceil(config.pipeline.batch_size);

    println!("\nInput:");
    println!("  URL list: {}", config.input.urls_path);
    println!("  URLs: {}", urls.len());
    println!("  Batches: {}", batches);

    println!("\n✓ Configuration is valid");

    Ok(())
}
