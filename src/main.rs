//! Listing Harvester main entry point
//!
//! This is the command-line interface for the Listing Harvester crawler.

use anyhow::Context;
use clap::Parser;
use listing_harvester::config::{load_config_with_hash, Config};
use listing_harvester::crawler::HttpCrawlDriver;
use listing_harvester::output::{print_run_report, print_summary, summarize};
use listing_harvester::storage::{JsonProgressStore, ProgressStore};
use listing_harvester::HarvestError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Listing Harvester: a resumable directory-site crawler
///
/// Listing Harvester walks a directory site's categories and subcategories,
/// appends every business listing to a CSV file and checkpoints its progress
/// so an interrupted run picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version)]
#[command(about = "A resumable directory-site crawler", long_about = None)]
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

    /// Delete the progress file and crawl every task again
    #[arg(long, conflicts_with = "stats")]
    fresh: bool,

    /// Discover the task list and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show the persisted progress summary and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.stats {
        handle_stats(&config);
        return Ok(());
    }

    if cli.fresh && !cli.dry_run {
        let store = JsonProgressStore::new(&config.output.progress_path);
        store
            .reset()
            .context("Failed to delete the progress file")?;
        tracing::info!("Starting fresh crawl (progress file removed)");
    }

    let driver = HttpCrawlDriver::from_config(config).context("Failed to set up the crawl")?;

    if cli.dry_run {
        handle_dry_run(&driver).await?;
    } else {
        handle_crawl(&driver).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
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

/// Handles the --stats mode: shows the persisted progress
fn handle_stats(config: &Config) {
    println!("Progress file: {}\n", config.output.progress_path);
    let state = JsonProgressStore::new(&config.output.progress_path).load();
    print_summary(&summarize(&state));
}

/// Handles the --dry-run mode: discovers tasks and marks which are pending
async fn handle_dry_run(driver: &HttpCrawlDriver) -> anyhow::Result<()> {
    println!("=== Listing Harvester Dry Run ===\n");

    let categories = driver
        .discover_categories()
        .await
        .context("Task discovery failed")?;
    let progress = driver.progress().await;

    let mut pending = 0;
    let mut total = 0;
    for (index, category) in categories.iter().enumerate() {
        println!("{}: {}", index + 1, category.name);
        for (idx, sub_category) in category.sub_categories.iter().enumerate() {
            let task_id = listing_harvester::state::task_id(&category.name, &sub_category.name);
            let marker = if progress.is_completed(&task_id) {
                "done"
            } else {
                pending += 1;
                if progress.is_failed(&task_id) {
                    "retry"
                } else {
                    "pending"
                }
            };
            total += 1;
            println!(
                "  {}. {} - {} [{}]",
                idx + 1,
                sub_category.name,
                sub_category.link,
                marker
            );
        }
    }

    println!("\n✓ {} categories, {} tasks", categories.len(), total);
    println!("✓ Would crawl {} tasks", pending);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(driver: &HttpCrawlDriver) -> anyhow::Result<()> {
    tracing::info!("Starting crawl (already completed tasks are skipped)");

    let report = tokio::select! {
        result = driver.run() => result,
        _ = tokio::signal::ctrl_c() => {
            // Dropping the run releases every open fetch context
            tracing::warn!("Interrupt received, stopping; unfinished tasks will be retried");
            Err(HarvestError::Interrupted)
        }
    };

    match report {
        Ok(report) => {
            print_run_report(&report);
            print_summary(&driver.summary().await);
            tracing::info!("Crawl completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
