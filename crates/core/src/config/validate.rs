use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog API key is set, the endpoint is a URL and the timeout is non-zero
/// - Server port is not 0
/// - Search threshold, storage key and command buffer are usable
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.catalog.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.api_key is required".to_string(),
        ));
    }

    if let Err(e) = reqwest::Url::parse(&config.catalog.base_url) {
        return Err(ConfigError::ValidationError(format!(
            "catalog.base_url is not a valid URL: {}",
            e
        )));
    }

    if config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.timeout_secs must be at least 1".to_string(),
        ));
    }

    if config.search.min_query_len == 0 {
        return Err(ConfigError::ValidationError(
            "search.min_query_len must be at least 1".to_string(),
        ));
    }

    if config.storage.watched_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.watched_key cannot be empty".to_string(),
        ));
    }

    if config.app.command_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "app.command_buffer must be at least 1".to_string(),
        ));
    }

    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}
