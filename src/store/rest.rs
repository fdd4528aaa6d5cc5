//! REST table store backend
//!
//! Talks to the hosted table API (PostgREST dialect): delete-by-equality is a
//! `DELETE` with an `eq.` filter on the key column, insert is a `POST` of the
//! full row. Both carry the service key as `apikey` and bearer headers.

use crate::config::StoreConfig;
use crate::report::ResortReport;
use crate::store::{ReportStore, StoreError, StoreResult};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use url::Url;

/// Column the store treats as the natural key
const KEY_COLUMN: &str = "Ski Resort";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Store client, shared for the whole run
pub struct RestStore {
    client: Client,
    rows_url: Url,
    api_key: String,
}

impl RestStore {
    /// Creates a store client from configuration and a resolved service key
    pub fn new(config: &StoreConfig, api_key: String) -> StoreResult<Self> {
        let base = Url::parse(&config.endpoint)?;
        let rows_url = base.join(&format!("rest/v1/{}", config.table))?;

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            rows_url,
            api_key,
        })
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn expect_success(response: Response) -> StoreResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }
}

impl ReportStore for RestStore {
    async fn delete_by_resort(&self, resort: &str) -> StoreResult<()> {
        let mut url = self.rows_url.clone();
        url.query_pairs_mut()
            .append_pair(KEY_COLUMN, &format!("eq.{}", resort));

        let response = self.authed(self.client.delete(url)).send().await?;
        Self::expect_success(response).await
    }

    async fn insert(&self, report: &ResortReport) -> StoreResult<()> {
        let response = self
            .authed(self.client.post(self.rows_url.clone()).json(report))
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        Self::expect_success(response).await
    }
}
