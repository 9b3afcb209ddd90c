//! Propscape main entry point
//!
//! Command-line interface for the property-listing harvester.

use anyhow::Context;
use clap::Parser;
use propscape::config::load_config_with_hash;
use propscape::harvest::{build_lanes, run_harvest};
use std::path::{Path, PathBuf};

/// Propscape: a concurrent property-listing harvester
///
/// Scans the configured sources lane by lane, enriches every discovered ad
/// with its detail page, and appends the results to a date-stamped CSV sink.
#[derive(Parser, Debug)]
#[command(name = "propscape")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent property-listing harvester", long_about = None)]
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

    /// Validate config and show the lane matrix without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load and validate configuration first; logging placement depends on it.
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    propscape::logging::init_logging(
        cli.verbose,
        cli.quiet,
        config.output.log_file.as_deref().map(Path::new),
    )
    .context("failed to initialize logging")?;

    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows the lane matrix
fn handle_dry_run(config: &propscape::config::Config) -> anyhow::Result<()> {
    println!("=== Propscape Dry Run ===\n");

    println!("Harvest Configuration:");
    println!("  Max pages per lane: {}", config.harvest.max_pages);
    println!("  List workers: {}", config.harvest.list_workers);
    println!("  Detail workers: {}", config.harvest.detail_workers);
    println!(
        "  Page delay: {}-{} ms",
        config.harvest.page_delay_ms.min, config.harvest.page_delay_ms.max
    );
    println!(
        "  Detail delay: {}-{} ms",
        config.harvest.detail_delay_ms.min, config.harvest.detail_delay_ms.max
    );

    println!("\nFetch Budget:");
    println!("  Max attempts: {}", config.fetch.max_attempts);
    println!("  Backoff base: {}s", config.fetch.backoff_base_secs);
    println!("  Timeout: {}s", config.fetch.timeout_secs);

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    match &config.output.log_file {
        Some(path) => println!("  Log file: {}", path),
        None => println!("  Log file: (console only)"),
    }

    let lanes = build_lanes(config)?;
    println!("\nLane Matrix ({} lanes):", lanes.len());
    for (lane, _) in &lanes {
        let header = if lane.header_carrier {
            "  [header carrier]"
        } else {
            ""
        };
        println!(
            "  - {} / {}: {}{}",
            lane.source, lane.status, lane.listing_url, header
        );
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: propscape::config::Config) -> anyhow::Result<()> {
    tracing::info!(
        "Sources: {}, max pages per lane: {}",
        config.sources.len(),
        config.harvest.max_pages
    );

    let report = run_harvest(config).await?;

    println!(
        "✓ Harvest complete: {} ads found across {} lanes",
        report.ads_found, report.lanes
    );
    println!(
        "✓ {} rows written to {}",
        report.rows_written,
        report.sink_path.display()
    );
    if report.rows_written < report.ads_found {
        println!(
            "  ({} rows lost to dropped batches, see the log)",
            report.ads_found - report.rows_written
        );
    }

    Ok(())
}
