//! Batch orchestration
//!
//! Drives one batch of URLs through fetch then extraction, collecting exactly
//! one outcome per input URL. Fetches run fully concurrently within the batch;
//! extraction runs in smaller sub-batches with a pacing pause between
//! dispatches, because the extraction backend tolerates far less concurrency
//! than the page hosts do.

use crate::config::{FetchConfig, PipelineConfig};
use crate::pipeline::extractor::Extractor;
use crate::pipeline::fetcher::{build_fetch_client, fetch_page};
use crate::report::{PageContent, PageOutcome, StageFailure};
use futures::future::join_all;
use std::time::Duration;

/// Runs one batch of URLs through fetch and extraction
///
/// Guarantee: the returned list contains exactly one outcome per input URL
/// (order may differ), and no fault from any individual fetch or extraction
/// escapes this function.
pub async fn run_batch(
    pipeline: &PipelineConfig,
    fetch: &FetchConfig,
    extractor: &Extractor,
    urls: &[String],
) -> Vec<PageOutcome> {
    // The fetch client lives exactly as long as this batch.
    let client = match build_fetch_client(fetch) {
        Ok(client) => client,
        Err(e) => {
            // No client means nothing in this batch can be fetched; degrade the
            // whole batch to fetch failures instead of propagating.
            let message = format!("failed to build fetch client: {}", e);
            return urls
                .iter()
                .map(|url| {
                    PageOutcome::failed(
                        url.clone(),
                        StageFailure::Fetch {
                            url: url.clone(),
                            message: message.clone(),
                        },
                    )
                })
                .collect();
        }
    };

    let mut outcomes = Vec::with_capacity(urls.len());

    // Phase one: fetch every URL in the batch concurrently.
    let fetches = urls.iter().map(|url| fetch_page(&client, url));
    let results = join_all(fetches).await;

    let mut fetched: Vec<PageContent> = Vec::new();
    for (url, result) in urls.iter().zip(results) {
        match result {
            Ok(page) => {
                tracing::info!("Successfully fetched {}", url);
                fetched.push(page);
            }
            Err(failure) => {
                tracing::warn!("Failed to fetch {}: {}", url, failure);
                outcomes.push(PageOutcome::failed(url.clone(), failure));
            }
        }
    }

    // Phase two: extract from the successful fetches, a sub-batch at a time,
    // pausing between dispatches but not after the last.
    for (index, sub_batch) in fetched.chunks(pipeline.extract_batch_size).enumerate() {
        if index > 0 {
            tokio::time::sleep(Duration::from_millis(pipeline.extract_pause_ms)).await;
        }

        for (url, result) in extractor.extract_batch(sub_batch).await {
            match &result {
                Ok(report) => tracing::info!(
                    "Extracted report for {} ({})",
                    url,
                    report.resort.as_deref().unwrap_or("unnamed resort")
                ),
                Err(failure) => tracing::warn!("Extraction failed for {}: {}", url, failure),
            }
            outcomes.push(PageOutcome { url, result });
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use serde_json::json;
    use std::collections::BTreeSet;
    use std::time::Instant;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pipeline_config(extract_batch_size: usize, extract_pause_ms: u64) -> PipelineConfig {
        PipelineConfig {
            batch_size: 3,
            extract_batch_size,
            extract_pause_ms,
            batch_pause_ms: 0,
        }
    }

    fn fetch_config() -> FetchConfig {
        FetchConfig {
            user_agent: "snowline-test/1.0".to_string(),
            request_timeout_secs: 5,
        }
    }

    fn extractor_for(server: &MockServer) -> Extractor {
        let config = ExtractorConfig {
            endpoint: format!("{}/v1/chat/completions", server.uri()),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "TEST_KEY".to_string(),
        };
        Extractor::new(&config, "test-key".to_string()).unwrap()
    }

    /// Mounts a page at `page_path` whose report region carries `marker`, plus a
    /// completion mock answering that marker with the given resort name.
    async fn mount_resort(server: &MockServer, page_path: &str, marker: &str, resort: &str) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<div class="skireport_reportContent__x">{marker} report</div>"#
            )))
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains(marker))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content":
                    format!(r#"{{"Ski Resort": "{}"}}"#, resort)}}]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_one_fetch_failure_does_not_stop_siblings() {
        let server = MockServer::start().await;

        mount_resort(&server, "/one", "ONE", "Resort One").await;
        mount_resort(&server, "/three", "THREE", "Resort Three").await;

        Mock::given(method("GET"))
            .and(path("/two"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let urls = vec![
            format!("{}/one", server.uri()),
            format!("{}/two", server.uri()),
            format!("{}/three", server.uri()),
        ];

        let extractor = extractor_for(&server);
        let outcomes = run_batch(&pipeline_config(3, 0), &fetch_config(), &extractor, &urls).await;

        // Coverage is exact: each input URL appears exactly once.
        assert_eq!(outcomes.len(), 3);
        let outcome_urls: BTreeSet<_> = outcomes.iter().map(|o| o.url.as_str()).collect();
        let input_urls: BTreeSet<_> = urls.iter().map(String::as_str).collect();
        assert_eq!(outcome_urls, input_urls);

        for outcome in &outcomes {
            if outcome.url.ends_with("/two") {
                assert!(matches!(
                    outcome.result,
                    Err(StageFailure::Fetch { .. })
                ));
            } else {
                assert!(
                    outcome.result.is_ok(),
                    "sibling {} should still reach extraction",
                    outcome.url
                );
            }
        }
    }

    #[tokio::test]
    async fn test_pause_between_sub_batches_but_not_after_last() {
        let server = MockServer::start().await;

        mount_resort(&server, "/a", "AAA", "Resort A").await;
        mount_resort(&server, "/b", "BBB", "Resort B").await;
        mount_resort(&server, "/c", "CCC", "Resort C").await;

        let urls = vec![
            format!("{}/a", server.uri()),
            format!("{}/b", server.uri()),
            format!("{}/c", server.uri()),
        ];
        let extractor = extractor_for(&server);

        // Sub-batch size 1 over three pages: two pauses expected.
        let pause_ms = 200;
        let started = Instant::now();
        let outcomes = run_batch(
            &pipeline_config(1, pause_ms),
            &fetch_config(),
            &extractor,
            &urls,
        )
        .await;
        let elapsed = started.elapsed();

        assert_eq!(outcomes.len(), 3);
        assert!(
            elapsed >= Duration::from_millis(2 * pause_ms),
            "expected at least two pacing pauses, elapsed {:?}",
            elapsed
        );

        // A single sub-batch must not pay any pacing pause at all.
        let started = Instant::now();
        let outcomes = run_batch(
            &pipeline_config(3, 2_000),
            &fetch_config(),
            &extractor,
            &urls,
        )
        .await;
        let elapsed = started.elapsed();

        assert_eq!(outcomes.len(), 3);
        assert!(
            elapsed < Duration::from_millis(2_000),
            "single sub-batch should not sleep, elapsed {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_all_fetches_failing_still_covers_every_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let urls = vec![
            format!("{}/x", server.uri()),
            format!("{}/y", server.uri()),
        ];
        let extractor = extractor_for(&server);

        let outcomes = run_batch(&pipeline_config(3, 0), &fetch_config(), &extractor, &urls).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o.result, Err(StageFailure::Fetch { .. }))));
    }
}
