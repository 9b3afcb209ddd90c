use crate::config::types::{Config, DelayRange, FetchConfig, HarvestConfig, SourceConfig};
use crate::extract;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    validate_sources(&config.sources)?;
    Ok(())
}

/// Validates harvest pipeline sizing and pacing
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.list_workers < 1 || config.list_workers > 200 {
        return Err(ConfigError::Validation(format!(
            "list_workers must be between 1 and 200, got {}",
            config.list_workers
        )));
    }

    if config.detail_workers < 1 || config.detail_workers > 400 {
        return Err(ConfigError::Validation(format!(
            "detail_workers must be between 1 and 400, got {}",
            config.detail_workers
        )));
    }

    validate_delay_range("page-delay-ms", &config.page_delay_ms)?;
    validate_delay_range("detail-delay-ms", &config.detail_delay_ms)?;

    Ok(())
}

fn validate_delay_range(name: &str, range: &DelayRange) -> Result<(), ConfigError> {
    if range.min > range.max {
        return Err(ConfigError::Validation(format!(
            "{} min ({}) must not exceed max ({})",
            name, range.min, range.max
        )));
    }
    Ok(())
}

/// Validates the fetch retry budget
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates source entries: known names, parseable URLs, at least one lane
fn validate_sources(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[source]] entry is required".to_string(),
        ));
    }

    for source in sources {
        if !extract::is_known_source(&source.name) {
            return Err(ConfigError::UnknownSource(source.name.clone()));
        }

        Url::parse(&source.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("base-url '{}': {}", source.base_url, e))
        })?;

        let lanes = source.lanes();
        if lanes.is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' must configure rent-url or sale-url",
                source.name
            )));
        }

        for (status, url) in lanes {
            Url::parse(url).map_err(|e| {
                ConfigError::InvalidUrl(format!(
                    "{} URL '{}' for source '{}': {}",
                    status, url, source.name, e
                ))
            })?;
        }
    }

    Ok(())
}
