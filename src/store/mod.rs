//! Persistence layer
//!
//! The store holds one current row per resort. Upserts are realized as
//! delete-then-insert keyed by the resort name, and every record's persistence
//! failure is caught and logged on its own so one bad record never blocks the
//! rest of a batch.

mod rest;

pub use rest::RestStore;

use crate::report::{PageOutcome, ResortReport};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("invalid store endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for report store backends
///
/// The store treats the resort name as the natural key but does not enforce
/// uniqueness itself, which is why replacement is an explicit delete followed
/// by an insert.
pub trait ReportStore {
    /// Deletes every row whose resort name equals `resort`
    fn delete_by_resort(
        &self,
        resort: &str,
    ) -> impl std::future::Future<Output = StoreResult<()>> + Send;

    /// Inserts a full report row
    fn insert(
        &self,
        report: &ResortReport,
    ) -> impl std::future::Future<Output = StoreResult<()>> + Send;
}

/// Persists the extracted reports from a batch of outcomes
///
/// For each outcome carrying a report with a resort name: delete any existing
/// rows for that name, then insert the new row. The two calls are sequential
/// and not wrapped in a store-level transaction, so a crash between them
/// leaves the resort absent until the next run — an accepted limitation.
/// Outcomes that failed upstream or extracted no resort name are skipped
/// silently. Returns the number of reports saved.
pub async fn persist_outcomes<S: ReportStore>(store: &S, outcomes: &[PageOutcome]) -> usize {
    let mut saved = 0;

    for outcome in outcomes {
        let report = match &outcome.result {
            Ok(report) => report,
            Err(_) => continue,
        };

        let resort = match report.resort.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                tracing::debug!("Skipping {}: extracted report has no resort name", outcome.url);
                continue;
            }
        };

        let replaced = async {
            store.delete_by_resort(resort).await?;
            store.insert(report).await
        }
        .await;

        match replaced {
            Ok(()) => {
                saved += 1;
                tracing::info!("Successfully saved data for {}", resort);
            }
            Err(e) => {
                tracing::error!(
                    "Error saving report for {} (from {}): {}",
                    resort,
                    outcome.url,
                    e
                );
            }
        }
    }

    saved
}
