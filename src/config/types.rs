use serde::Deserialize;

/// Main configuration structure for Snowline
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub input: InputConfig,
    pub fetch: FetchConfig,
    pub extractor: ExtractorConfig,
    pub store: StoreConfig,
}

/// Batching and pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of URLs fetched concurrently per batch
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Number of concurrent extraction calls per sub-batch
    #[serde(rename = "extract-batch-size")]
    pub extract_batch_size: usize,

    /// Pause between successive extraction sub-batches (milliseconds)
    #[serde(rename = "extract-pause-ms")]
    pub extract_pause_ms: u64,

    /// Pause after each batch completes, persistence included (milliseconds)
    #[serde(rename = "batch-pause-ms")]
    pub batch_pause_ms: u64,
}

/// Input source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Path to the newline-delimited URL list
    #[serde(rename = "urls-path")]
    pub urls_path: String,
}

/// Page fetching configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// User agent sent with every page request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

/// Extraction backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// Chat-completions endpoint URL
    pub endpoint: String,

    /// Model identifier passed with every request
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,
}

/// Persistent store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted table API
    pub endpoint: String,

    /// Table that holds one row per resort
    pub table: String,

    /// Name of the environment variable holding the service key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,
}
