//! Pipeline module: fetch, extract, persist
//!
//! This module contains the core pipeline logic, including:
//! - Page fetching with per-URL failure capture
//! - Report content selection
//! - Structured extraction through the completion backend
//! - Batch orchestration and the top-level run loop

mod extractor;
mod fetcher;
mod runner;
mod selector;

pub use extractor::Extractor;
pub use fetcher::{build_fetch_client, fetch_page};
pub use runner::run_batch;
pub use selector::select_report_content;

use crate::config::Config;
use crate::store::{persist_outcomes, ReportStore, RestStore};
use crate::{Result, SnowlineError};
use std::path::Path;
use std::time::Duration;

/// Totals reported after a completed run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// URLs taken from the input list
    pub total_urls: usize,
    /// Batches processed
    pub batches: usize,
    /// Terminal outcomes produced (always equals `total_urls`)
    pub outcomes: usize,
    /// Reports that made it into the store
    pub reports_saved: usize,
}

/// Runs the full pipeline from configuration
///
/// Resolves credentials from the environment, loads the URL list, and drives
/// every batch through fetch, extraction, and persistence. Only startup faults
/// return an error; once batching begins, failures stay per-item.
pub async fn run_pipeline(config: Config) -> Result<RunSummary> {
    let urls = load_source_urls(Path::new(&config.input.urls_path))?;

    let extractor_key = require_env(&config.extractor.api_key_env)?;
    let store_key = require_env(&config.store.api_key_env)?;

    let extractor = Extractor::new(&config.extractor, extractor_key)?;
    let store = RestStore::new(&config.store, store_key)?;

    run_with_store(&config, &extractor, &store, &urls).await
}

/// Drives the batch loop against an explicit extractor and store
///
/// Batches run strictly in sequence: batch N+1 never starts before batch N,
/// persistence included, has completed. A fixed pacing pause follows each
/// batch.
pub async fn run_with_store<S: ReportStore>(
    config: &Config,
    extractor: &Extractor,
    store: &S,
    urls: &[String],
) -> Result<RunSummary> {
    let batch_size = config.pipeline.batch_size;
    let total_batches = urls.len().div_ceil(batch_size);

    let mut summary = RunSummary {
        total_urls: urls.len(),
        ..RunSummary::default()
    };

    if urls.is_empty() {
        tracing::warn!("URL list is empty, nothing to do");
        return Ok(summary);
    }

    for (index, batch_urls) in urls.chunks(batch_size).enumerate() {
        tracing::info!("Processing batch {} of {}", index + 1, total_batches);

        let outcomes = run_batch(&config.pipeline, &config.fetch, extractor, batch_urls).await;
        summary.outcomes += outcomes.len();

        summary.reports_saved += persist_outcomes(store, &outcomes).await;
        summary.batches += 1;

        tracing::info!("Completed batch {} of {}", index + 1, total_batches);

        tokio::time::sleep(Duration::from_millis(config.pipeline.batch_pause_ms)).await;
    }

    tracing::info!(
        "Run complete: {} URLs, {} batches, {} reports saved",
        summary.total_urls,
        summary.batches,
        summary.reports_saved
    );

    Ok(summary)
}

/// Loads the source URL list, one URL per non-empty line
pub fn load_source_urls(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| SnowlineError::UrlList {
        path: path.display().to_string(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

fn require_env(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| SnowlineError::MissingCredential(var.to_string()))
}
