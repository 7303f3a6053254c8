use crate::config::types::{
    ClientConfig, Config, EndpointConfig, FilterConfig, HarvestConfig, OutputConfig, SearchConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Construction-level faults (empty keyword list, non-positive concurrency,
/// malformed endpoint URLs) are fatal to the whole run, so they are rejected
/// here before any network work starts.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_harvest_config(&config.harvest)?;
    validate_endpoint_config(&config.endpoints)?;
    validate_client_config(&config.client)?;
    validate_filter_config(&config.filter)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates identifier discovery configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "search.keywords must contain at least one keyword".to_string(),
        ));
    }

    if config.keywords.iter().any(|kw| kw.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "search.keywords must not contain empty keywords".to_string(),
        ));
    }

    if config.target_count < 1 {
        return Err(ConfigError::Validation(format!(
            "target-count must be >= 1, got {}",
            config.target_count
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.page_size < 1 || config.page_size > 50 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 50, got {}",
            config.page_size
        )));
    }

    if config.page_delay_min_ms > config.page_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "page-delay-min-ms ({}) must not exceed page-delay-max-ms ({})",
            config.page_delay_min_ms, config.page_delay_max_ms
        )));
    }

    Ok(())
}

/// Validates harvesting configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 50 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 50, got {}",
            config.concurrency
        )));
    }

    Ok(())
}

/// Validates endpoint configuration
fn validate_endpoint_config(config: &EndpointConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("search-url", &config.search_url),
        ("view-url", &config.view_url),
        ("stream-url", &config.stream_url),
    ] {
        Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;
    }

    Ok(())
}

/// Validates HTTP transport configuration
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry-attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    Ok(())
}

/// Validates filter configuration
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.topic_keywords.is_empty() {
        return Err(ConfigError::Validation(
            "filter.topic-keywords must contain at least one keyword".to_string(),
        ));
    }

    if config.top_n < 1 {
        return Err(ConfigError::Validation(format!(
            "top-n must be >= 1, got {}",
            config.top_n
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty".to_string(),
        ));
    }

    if config.comments_csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "comments-csv-path cannot be empty".to_string(),
        ));
    }

    if config.raw_path.is_empty() {
        return Err(ConfigError::Validation(
            "raw-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
