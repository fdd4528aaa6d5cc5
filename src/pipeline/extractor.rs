//! Structured extraction through the chat-completions backend
//!
//! Each page's report text is sent as one completion request that asks for a
//! JSON object with the exact store column names. Requests within a sub-batch
//! are issued concurrently and awaited together; the result list is always
//! order- and count-preserving, with per-item failures carried as values.

use crate::config::ExtractorConfig;
use crate::pipeline::selector::select_report_content;
use crate::report::{PageContent, ResortReport, StageFailure};
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that extracts ski resort information from webpage content.";

/// Completion requests get a generous timeout; the backend is slow on long pages.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the extraction backend, shared for the whole run
pub struct Extractor {
    client: Client,
    endpoint: Url,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl Extractor {
    /// Creates an extractor from configuration and a resolved API key
    pub fn new(config: &ExtractorConfig, api_key: String) -> Result<Self, crate::SnowlineError> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key,
        })
    }

    /// Extracts reports for one sub-batch of fetched pages
    ///
    /// All requests are dispatched concurrently; the method waits for every one
    /// of them before returning. The output is order- and count-preserving: one
    /// entry per input page, failures included. Nothing here retries and
    /// nothing propagates — a backend fault for one page is that page's
    /// failure alone.
    pub async fn extract_batch(
        &self,
        pages: &[PageContent],
    ) -> Vec<(String, Result<ResortReport, StageFailure>)> {
        let requests = pages.iter().map(|page| self.extract_one(page));
        let results = join_all(requests).await;

        pages
            .iter()
            .map(|page| page.url.clone())
            .zip(results)
            .collect()
    }

    async fn extract_one(&self, page: &PageContent) -> Result<ResortReport, StageFailure> {
        let report_content = select_report_content(&page.html);
        let prompt = build_extraction_prompt(&report_content);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| StageFailure::ExtractionDispatch {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StageFailure::ExtractionDispatch {
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let envelope: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| StageFailure::ExtractionParse {
                    message: format!("response body was not valid JSON: {}", e),
                })?;

        let content = envelope
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| StageFailure::ExtractionParse {
                message: "response contained no choices".to_string(),
            })?;

        serde_json::from_str(content).map_err(|e| StageFailure::ExtractionParse {
            message: format!("completion was not a valid report object: {}", e),
        })
    }
}

/// Builds the per-page extraction prompt
///
/// The prompt pins down the exact output keys, asks for null on unknown
/// fields, and coerces snow measurements to integers while keeping lifts and
/// runs as free text (they arrive as "x/y open" strings).
fn build_extraction_prompt(report_content: &str) -> String {
    format!(
        r#"Extract the following information from this ski resort webpage content. Return numbers for snowfall and snow depth (convert text numbers to digits), but keep lifts and runs as text. Return null if not found.

1. Resort Name (text)
2. Past Snowfall (in inches, for last 6 days)
3. Forecasted Snowfall (in inches, for next 6 days)
4. Mid Mountain Snow Depth (in inches)
5. Number of Lifts Open (keep as text, e.g. "5/8 Lifts Open")
6. Number of Runs Open (keep as text, e.g. "20/35 Runs Open")

Content: {report_content}

Format your response as a JSON object with these exact keys:
{{
    "Ski Resort": "name",
    "Snowfall 6 days ago": number,
    "Snowfall 5 days ago": number,
    "Snowfall 4 days ago": number,
    "Snowfall 3 days ago": number,
    "Snowfall 2 days ago": number,
    "Snowfall 1 day ago": number,
    "Snowfall forecasted today": number,
    "Snowfall forecasted in 1 day": number,
    "Snowfall forecasted in 2 days": number,
    "Snowfall forecasted in 3 days": number,
    "Snowfall forecasted in 4 days": number,
    "Snowfall forecasted in 5 days": number,
    "Mid Mountain Snow": number,
    "Lifts Open": "text",
    "Runs Open": "text"
}}
Use null for any missing values. Convert snow measurements to integers, but keep lifts and runs as text."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_extractor(endpoint: &str) -> Extractor {
        let config = ExtractorConfig {
            endpoint: format!("{}/v1/chat/completions", endpoint),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "TEST_KEY".to_string(),
        };
        Extractor::new(&config, "test-key".to_string()).unwrap()
    }

    fn page(url: &str, marker: &str) -> PageContent {
        PageContent {
            url: url.to_string(),
            html: format!(
                r#"<div class="skireport_reportContent__x">{marker} snow facts</div>"#
            ),
        }
    }

    /// Wraps a report JSON string in a chat-completions response envelope
    fn completion_body(report_json: &str) -> serde_json::Value {
        json!({
            "choices": [{"message": {"content": report_json}}]
        })
    }

    #[test]
    fn test_prompt_names_every_store_column() {
        let prompt = build_extraction_prompt("some content");
        for key in [
            "Ski Resort",
            "Snowfall 6 days ago",
            "Snowfall 1 day ago",
            "Snowfall forecasted today",
            "Snowfall forecasted in 5 days",
            "Mid Mountain Snow",
            "Lifts Open",
            "Runs Open",
        ] {
            assert!(prompt.contains(key), "prompt missing key {}", key);
        }
        assert!(prompt.contains("some content"));
    }

    #[tokio::test]
    async fn test_extract_batch_preserves_order_and_count() {
        let server = MockServer::start().await;

        for (marker, resort) in [("ALPHA", "Alpha Bowl"), ("BRAVO", "Bravo Peak")] {
            Mock::given(method("POST"))
                .and(path("/v1/chat/completions"))
                .and(body_string_contains(marker))
                .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                    &format!(r#"{{"Ski Resort": "{}"}}"#, resort),
                )))
                .mount(&server)
                .await;
        }

        let extractor = test_extractor(&server.uri());
        let pages = vec![page("https://a.test/1", "ALPHA"), page("https://b.test/2", "BRAVO")];

        let results = extractor.extract_batch(&pages).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "https://a.test/1");
        assert_eq!(
            results[0].1.as_ref().unwrap().resort.as_deref(),
            Some("Alpha Bowl")
        );
        assert_eq!(results[1].0, "https://b.test/2");
        assert_eq!(
            results[1].1.as_ref().unwrap().resort.as_deref(),
            Some("Bravo Peak")
        );
    }

    #[tokio::test]
    async fn test_malformed_completion_fails_only_that_item() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("GOOD-ONE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                r#"{"Ski Resort": "First Summit"}"#,
            )))
            .mount(&server)
            .await;

        // The middle item comes back as prose instead of a JSON object.
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("BAD-ONE"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("Sorry, I could not find that.")),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("GOOD-TWO"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                r#"{"Ski Resort": "Third Summit"}"#,
            )))
            .mount(&server)
            .await;

        let extractor = test_extractor(&server.uri());
        let pages = vec![
            page("https://a.test/1", "GOOD-ONE"),
            page("https://a.test/2", "BAD-ONE"),
            page("https://a.test/3", "GOOD-TWO"),
        ];

        let results = extractor.extract_batch(&pages).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(matches!(
            results[1].1,
            Err(StageFailure::ExtractionParse { .. })
        ));
        assert!(results[2].1.is_ok());
    }

    #[tokio::test]
    async fn test_backend_rejection_is_dispatch_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let extractor = test_extractor(&server.uri());
        let pages = vec![page("https://a.test/1", "ALPHA")];

        let results = extractor.extract_batch(&pages).await;

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].1,
            Err(StageFailure::ExtractionDispatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_choices_is_parse_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let extractor = test_extractor(&server.uri());
        let pages = vec![page("https://a.test/1", "ALPHA")];

        let results = extractor.extract_batch(&pages).await;
        assert!(matches!(
            results[0].1,
            Err(StageFailure::ExtractionParse { .. })
        ));
    }
}
