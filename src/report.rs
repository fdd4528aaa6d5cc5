//! Pipeline data model
//!
//! The central invariant of the pipeline lives here: every source URL maps to
//! exactly one [`PageOutcome`] by the end of a run, whether the URL produced a
//! [`ResortReport`] or failed at some stage along the way.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw markup paired with the URL it was fetched from
///
/// Produced by the fetcher on success and consumed once by content selection;
/// not retained afterward.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub url: String,
    pub html: String,
}

/// One resort's current snow facts, as returned by the extraction backend
///
/// Field names serialize to the exact column names the store expects. Every
/// field is optional; a report can only be persisted when `resort` is present,
/// since the resort name is the store's natural key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResortReport {
    #[serde(rename = "Ski Resort")]
    pub resort: Option<String>,

    #[serde(rename = "Snowfall 6 days ago")]
    pub snowfall_6_days_ago: Option<i64>,
    #[serde(rename = "Snowfall 5 days ago")]
    pub snowfall_5_days_ago: Option<i64>,
    #[serde(rename = "Snowfall 4 days ago")]
    pub snowfall_4_days_ago: Option<i64>,
    #[serde(rename = "Snowfall 3 days ago")]
    pub snowfall_3_days_ago: Option<i64>,
    #[serde(rename = "Snowfall 2 days ago")]
    pub snowfall_2_days_ago: Option<i64>,
    #[serde(rename = "Snowfall 1 day ago")]
    pub snowfall_1_day_ago: Option<i64>,

    #[serde(rename = "Snowfall forecasted today")]
    pub forecast_today: Option<i64>,
    #[serde(rename = "Snowfall forecasted in 1 day")]
    pub forecast_in_1_day: Option<i64>,
    #[serde(rename = "Snowfall forecasted in 2 days")]
    pub forecast_in_2_days: Option<i64>,
    #[serde(rename = "Snowfall forecasted in 3 days")]
    pub forecast_in_3_days: Option<i64>,
    #[serde(rename = "Snowfall forecasted in 4 days")]
    pub forecast_in_4_days: Option<i64>,
    #[serde(rename = "Snowfall forecasted in 5 days")]
    pub forecast_in_5_days: Option<i64>,

    #[serde(rename = "Mid Mountain Snow")]
    pub mid_mountain_snow: Option<i64>,

    /// Kept as text, e.g. "5/8 Lifts Open"
    #[serde(rename = "Lifts Open")]
    pub lifts_open: Option<String>,
    /// Kept as text, e.g. "20/35 Runs Open"
    #[serde(rename = "Runs Open")]
    pub runs_open: Option<String>,
}

/// Terminal per-URL result of a run
#[derive(Debug)]
pub struct PageOutcome {
    pub url: String,
    pub result: Result<ResortReport, StageFailure>,
}

impl PageOutcome {
    pub fn extracted(url: impl Into<String>, report: ResortReport) -> Self {
        Self {
            url: url.into(),
            result: Ok(report),
        }
    }

    pub fn failed(url: impl Into<String>, failure: StageFailure) -> Self {
        Self {
            url: url.into(),
            result: Err(failure),
        }
    }
}

/// Why a URL failed to produce a report
///
/// Dispatch faults (backend unreachable, HTTP-level rejection) are kept distinct
/// from parse faults (backend answered, but not in the expected shape) so a
/// future retry layer can treat them differently.
#[derive(Debug, Clone, Error)]
pub enum StageFailure {
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("extraction response was not in the expected shape: {message}")]
    ExtractionParse { message: String },

    #[error("extraction dispatch failed: {message}")]
    ExtractionDispatch { message: String },
}
