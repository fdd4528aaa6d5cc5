//! Page fetcher
//!
//! Wraps the HTTP layer that pulls down resort report pages. Fetch faults are
//! captured as [`StageFailure::Fetch`] values so a bad URL never aborts its
//! siblings; the client itself is built per batch and dropped at batch end.

use crate::config::FetchConfig;
use crate::report::{PageContent, StageFailure};
use reqwest::{header, Client};
use std::time::Duration;

/// Builds the batch-scoped HTTP client
///
/// Caching is disabled so every run observes live report content.
pub fn build_fetch_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-cache"),
    );

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .default_headers(headers)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a single report page
///
/// # Returns
///
/// * `Ok(PageContent)` - The rendered markup and the URL it came from
/// * `Err(StageFailure::Fetch)` - Any HTTP or network fault, as a value
pub async fn fetch_page(client: &Client, url: &str) -> Result<PageContent, StageFailure> {
    let fetch_failure = |message: String| StageFailure::Fetch {
        url: url.to_string(),
        message,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_failure(classify_error(&e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_failure(format!("HTTP {}", status.as_u16())));
    }

    let html = response
        .text()
        .await
        .map_err(|e| fetch_failure(e.to_string()))?;

    Ok(PageContent {
        url: url.to_string(),
        html,
    })
}

/// Classifies a reqwest error into a stable message
fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        "connection refused".to_string()
    } else {
        error.to_string()
    }
}
