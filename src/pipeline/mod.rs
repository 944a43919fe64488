//! The aggregation pipeline: fetch → normalize → dedupe → rank → truncate.
//!
//! Sources run one after another in configuration order. Each produces a
//! [`SourceReport`]; a failing source is logged and contributes nothing, so
//! the digest degrades to fewer results instead of aborting.

mod merge;
mod rank;

pub use merge::{DedupStrategy, merge};
pub use rank::rank;

use crate::models::{Article, SourceReport};
use crate::sources::Source;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Run every source sequentially and report each outcome.
///
/// # Arguments
///
/// * `sources` - Configured adapters, in fetch order
/// * `http` - Shared client for provider and feed requests
///
/// # Returns
///
/// One [`SourceReport`] per source, in the same order. Failures are logged
/// and kept as `Err` outcomes; this function itself never fails.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn collect(sources: &[Source], http: &reqwest::Client) -> Vec<SourceReport> {
    let mut reports = Vec::with_capacity(sources.len());
    for source in sources {
        let name = source.name();
        let t0 = Instant::now();
        let outcome = source.fetch(http).await;
        let elapsed_ms = t0.elapsed().as_millis();
        match &outcome {
            Ok(articles) => info!(source = %name, count = articles.len(), elapsed_ms, "Source fetched"),
            Err(e) => error!(source = %name, error = %e, elapsed_ms, "Source failed; continuing without it"),
        }
        reports.push(SourceReport {
            source: name,
            outcome,
        });
    }

    let failed = reports.iter().filter(|r| r.is_failure()).count();
    info!(total = reports.len(), failed, "Collected source reports");
    reports
}

/// Merge, rank and truncate collected reports into the digest.
pub fn build_digest(
    reports: &[SourceReport],
    strategy: DedupStrategy,
    max_articles: usize,
) -> Vec<Article> {
    let merged = merge(reports, strategy);
    let digest = rank(merged, max_articles);
    info!(count = digest.len(), "Digest assembled");
    digest
}
