//! Danmu-Harvest main entry point
//!
//! Command-line interface for the topic-driven bullet-comment harvester.

use clap::Parser;
use danmu_harvest::config::load_config_with_hash;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Danmu-Harvest: a topic-driven bullet-comment harvester
///
/// Discovers videos matching the configured search keywords, harvests their
/// bullet-comment streams under politeness and concurrency limits, and writes
/// a ranked, filtered summary of the most relevant comments.
#[derive(Parser, Debug)]
#[command(name = "danmu-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A topic-driven bullet-comment harvester", long_about = None)]
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

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with = "report_only")]
    dry_run: bool,

    /// Rebuild the report files from the saved raw harvest and exit
    #[arg(long, conflicts_with = "dry_run")]
    report_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    if cli.report_only {
        return handle_report_only(&config);
    }

    handle_run(config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("danmu_harvest=info,warn"),
            1 => EnvFilter::new("danmu_harvest=debug,info"),
            2 => EnvFilter::new("danmu_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the run plan
fn handle_dry_run(config: &danmu_harvest::config::Config) {
    println!("=== Danmu-Harvest Dry Run ===\n");

    println!("Search:");
    println!("  Keywords: {}", config.search.keywords.join(", "));
    println!("  Target count: {}", config.search.target_count);
    println!("  Page ceiling: {}", config.search.max_pages);
    println!(
        "  Page delay: {}-{}ms",
        config.search.page_delay_min_ms, config.search.page_delay_max_ms
    );

    println!("\nHarvest:");
    println!("  Concurrency: {}", config.harvest.concurrency);
    println!("  Request delay: {}ms", config.harvest.request_delay_ms);
    println!("  Part delay: {}ms", config.harvest.part_delay_ms);

    println!("\nTransport:");
    println!("  Timeout: {}s", config.client.timeout_secs);
    println!("  Retry attempts: {}", config.client.retry_attempts);
    println!("  Backoff base: {}ms", config.client.backoff_base_ms);

    println!("\nFilter:");
    println!("  Topic keywords: {}", config.filter.topic_keywords.join(", "));
    println!("  Top N: {}", config.filter.top_n);

    println!("\nOutput:");
    println!("  Summary: {}", config.output.summary_path);
    println!("  Comments CSV: {}", config.output.comments_csv_path);
    println!("  Raw snapshot: {}", config.output.raw_path);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would harvest up to {} videos with {} workers",
        config.search.target_count, config.harvest.concurrency
    );
}

/// Handles the --report-only mode: re-renders the report files from the raw
/// snapshot of a previous run
fn handle_report_only(config: &danmu_harvest::config::Config) -> anyhow::Result<()> {
    let summary = danmu_harvest::pipeline::rerender(config)?;

    println!(
        "Report rebuilt from snapshot of {}: {} comments ({} kept after filtering)",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.total_comments,
        summary.kept_comments
    );
    println!("Summary written to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_run(
    config: danmu_harvest::config::Config,
    config_hash: String,
) -> anyhow::Result<()> {
    tracing::info!(
        "Starting harvest: {} keyword(s), target {} videos, concurrency {}",
        config.search.keywords.len(),
        config.search.target_count,
        config.harvest.concurrency
    );

    let summary_path = config.output.summary_path.clone();
    let summary = danmu_harvest::pipeline::run(config, config_hash).await?;

    println!(
        "Harvest complete: attempted {}, succeeded {}, failed {}, {} comments ({} kept after filtering)",
        summary.attempted,
        summary.succeeded,
        summary.failed,
        summary.total_comments,
        summary.kept_comments
    );
    println!("Summary written to: {}", summary_path);

    Ok(())
}
