//! End-to-end pipeline orchestration
//!
//! Wires the stages together: discovery → coordinated harvest → filtering →
//! report files. Each component receives its configuration explicitly at
//! construction; the HTTP client is owned here and shared by reference (or
//! `Arc`) with the stages that need it.

use crate::client::RateLimitedClient;
use crate::config::Config;
use crate::discover::IdentifierDiscoverer;
use crate::filter::CommentFilter;
use crate::harvest::{CommentHarvester, HarvestCoordinator, HarvestOutcome};
use crate::report::{self, RunSummary, VideoSummary};
use crate::Result;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

/// Runs one complete harvest-and-report cycle
///
/// The run always completes and reports counts of attempted, succeeded, and
/// failed identifiers; partial failure never aborts the run or discards
/// already-collected data.
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `config_hash` - Hash of the config file, recorded in the summary
pub async fn run(config: Config, config_hash: String) -> Result<RunSummary> {
    let started_at = Utc::now();

    let client = Arc::new(RateLimitedClient::new(
        &config.client,
        &config.endpoints.referer,
    )?);

    // Stage 1: sequential discovery
    let discoverer = IdentifierDiscoverer::new(&client, &config.search, &config.endpoints)?;
    let identifiers = discoverer.discover().await;

    if identifiers.is_empty() {
        tracing::warn!("No identifiers discovered; report will be empty");
    }

    // Stage 2: concurrent harvest
    let harvester = CommentHarvester::new(
        Arc::clone(&client),
        config.harvest.clone(),
        config.endpoints.clone(),
    );
    let coordinator = HarvestCoordinator::new(harvester, config.harvest.concurrency);
    let outcome = coordinator.run(identifiers).await;

    // Stage 3: raw snapshot, written before any filtering so a report can
    // always be rebuilt from it
    let snapshot = report::HarvestSnapshot {
        recorded_at: started_at,
        config_hash: config_hash.clone(),
        keywords: config.search.keywords.clone(),
        results: outcome.results.clone(),
        failures: outcome.failures.clone(),
    };
    report::write_snapshot(&snapshot, Path::new(&config.output.raw_path))?;

    // Stage 4: filter + report files
    let keywords = config.search.keywords.clone();
    let summary = render_reports(&config, config_hash, keywords, started_at, &outcome)?;

    tracing::info!(
        "Run finished in {}s: {} comments harvested, {} kept after filtering",
        summary.duration_seconds(),
        summary.total_comments,
        summary.kept_comments
    );

    Ok(summary)
}

/// Rebuilds the report files from the raw snapshot of a previous run
///
/// No network traffic: the snapshot at `output.raw-path` is the only input,
/// so filter and report settings can be retuned after the fact. The recorded
/// harvest start time and config hash are carried over from the snapshot.
pub fn rerender(config: &Config) -> Result<RunSummary> {
    let snapshot = report::read_snapshot(Path::new(&config.output.raw_path))?;

    tracing::info!(
        "Re-rendering report from snapshot of {} ({} results, {} failures)",
        snapshot.recorded_at.format("%Y-%m-%d %H:%M:%S UTC"),
        snapshot.results.len(),
        snapshot.failures.len()
    );

    let outcome = HarvestOutcome {
        results: snapshot.results,
        failures: snapshot.failures,
    };

    render_reports(
        config,
        snapshot.config_hash,
        snapshot.keywords,
        snapshot.recorded_at,
        &outcome,
    )
}

/// Runs the classification collaborator and writes the report files
fn render_reports(
    config: &Config,
    config_hash: String,
    keywords: Vec<String>,
    started_at: chrono::DateTime<Utc>,
    outcome: &HarvestOutcome,
) -> Result<RunSummary> {
    let filter = CommentFilter::new(&config.filter)?;
    let records = outcome.comment_records();
    let filtered = filter.apply(&records);
    let ranked = filter.rank(&filtered);
    let terms = CommentFilter::term_frequencies(&ranked);

    let summary = build_summary(
        config_hash,
        keywords,
        started_at,
        outcome,
        &filtered,
        ranked,
        terms,
    );

    report::write_summary(&summary, Path::new(&config.output.summary_path))?;
    report::write_comments_csv(&summary.top_comments, Path::new(&config.output.comments_csv_path))?;

    Ok(summary)
}

fn build_summary(
    config_hash: String,
    keywords: Vec<String>,
    started_at: chrono::DateTime<Utc>,
    outcome: &HarvestOutcome,
    filtered: &crate::filter::FilterOutcome,
    top_comments: Vec<crate::filter::RankedComment>,
    term_frequencies: Vec<(String, usize)>,
) -> RunSummary {
    let videos = outcome
        .results
        .iter()
        .map(|r| VideoSummary {
            id: r.id.to_string(),
            title: r.title.clone(),
            author: r.author.clone(),
            parts: r.streams.len(),
            failed_parts: r.failed_streams.len(),
            comment_count: r.comment_count(),
        })
        .collect();

    RunSummary {
        started_at,
        finished_at: Utc::now(),
        config_hash,
        keywords,
        attempted: outcome.attempted(),
        succeeded: outcome.succeeded(),
        failed: outcome.failed(),
        total_comments: outcome.total_comments(),
        kept_comments: filtered.kept.len(),
        dropped_noise: filtered.dropped_noise,
        dropped_off_topic: filtered.dropped_off_topic,
        top_comments,
        term_frequencies,
        videos,
        failures: outcome.failures.clone(),
    }
}
