use crate::config::types::{Config, ExtractorConfig, FetchConfig, PipelineConfig, StoreConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_pipeline_config(&config.pipeline)?;
    validate_input_config(&config.input)?;
    validate_fetch_config(&config.fetch)?;
    validate_extractor_config(&config.extractor)?;
    validate_store_config(&config.store)?;
    Ok(())
}

/// Validates batching and pacing configuration
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.extract_batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "extract_batch_size must be >= 1, got {}",
            config.extract_batch_size
        )));
    }

    // Extraction concurrency must never exceed fetch concurrency; the narrower
    // bound exists to respect the extraction backend's rate limits.
    if config.extract_batch_size > config.batch_size {
        return Err(ConfigError::Validation(format!(
            "extract_batch_size ({}) must not exceed batch_size ({})",
            config.extract_batch_size, config.batch_size
        )));
    }

    Ok(())
}

/// Validates the input source configuration
fn validate_input_config(config: &crate::config::types::InputConfig) -> Result<(), ConfigError> {
    if config.urls_path.is_empty() {
        return Err(ConfigError::Validation(
            "urls_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates page fetching configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates extraction backend configuration
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid extractor endpoint: {}", e)))?;

    if config.model.is_empty() {
        return Err(ConfigError::Validation(
            "extractor model cannot be empty".to_string(),
        ));
    }

    if config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "extractor api_key_env cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates persistent store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid store endpoint: {}", e)))?;

    if config.table.is_empty() {
        return Err(ConfigError::Validation(
            "store table cannot be empty".to_string(),
        ));
    }

    if config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "store api_key_env cannot be empty".to_string(),
        ));
    }

    Ok(())
}
