use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, ProgramConfig, SiteConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// User-Agent prefixes the site refuses to serve
const DEFAULT_CLIENT_IDS: &[&str] = &["reqwest/", "python-requests/", "python-urllib/"];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    validate_programs(&config.programs)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and 64, got {}",
            config.max_concurrency
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.run_deadline_secs == Some(0) {
        return Err(ConfigError::Validation(
            "run_deadline_secs must be >= 1 when set".to_string(),
        ));
    }

    if config.max_connectors == Some(0) {
        return Err(ConfigError::Validation(
            "max_connectors must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates request identity headers
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    let user_agent = config.user_agent.trim();
    if user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    let lowered = user_agent.to_lowercase();
    if DEFAULT_CLIENT_IDS
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return Err(ConfigError::Validation(format!(
            "user_agent '{}' is a default client identifier and will be rejected",
            config.user_agent
        )));
    }

    if config.accept.trim().is_empty() {
        return Err(ConfigError::Validation("accept cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates the site root
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root_url '{}' must use http or https",
            config.root_url
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if matches!(&config.summary_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates program entries
fn validate_programs(programs: &[ProgramConfig]) -> Result<(), ConfigError> {
    if programs.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[program]] must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for program in programs {
        for (field, value) in [
            ("model", &program.model),
            ("prog-id", &program.prog_id),
            ("entry-catalog", &program.entry_catalog),
        ] {
            validate_path_segment(field, value)?;
        }

        if !seen.insert((program.model.as_str(), program.prog_id.as_str())) {
            return Err(ConfigError::Validation(format!(
                "program {}/{} is configured more than once",
                program.model, program.prog_id
            )));
        }
    }

    Ok(())
}

/// Values that end up in URL paths and file names
fn validate_path_segment(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }

    if value.contains('/') || value.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "{} must not contain path separators, got '{}'",
            field, value
        )));
    }

    Ok(())
}
