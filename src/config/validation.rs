use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};

/// Upper bound on concurrent fetches
const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
///
/// Called by `load_config`, and again by the CLI after flag overrides are applied.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_workers < 1 || config.max_workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.max_workers
        )));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be greater than 0".to_string(),
        ));
    }

    if config.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_ms must be greater than 0".to_string(),
        ));
    }

    if config.max_document_bytes == 0 {
        return Err(ConfigError::Validation(
            "max_document_bytes must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // Crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if let Some(path) = &config.summary_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_worker_bounds() {
        let mut config = Config::default();

        config.crawler.max_workers = 0;
        assert!(validate(&config).is_err());

        config.crawler.max_workers = MAX_WORKERS + 1;
        assert!(validate(&config).is_err());

        config.crawler.max_workers = 1;
        assert!(validate(&config).is_ok());

        config.crawler.max_workers = MAX_WORKERS;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = Config::default();
        config.crawler.request_timeout_ms = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.connect_timeout_ms = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_document_limit_rejected() {
        let mut config = Config::default();
        config.crawler.max_document_bytes = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_crawler_name_validation() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "Site-Graph2".to_string();
        assert!(validate(&config).is_ok());

        config.user_agent.crawler_name = "Site Graph".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_version_rejected() {
        let mut config = Config::default();
        config.user_agent.crawler_version = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_blank_summary_path_rejected() {
        let mut config = Config::default();
        config.output.summary_path = Some(String::new());
        assert!(validate(&config).is_err());

        config.output.summary_path = Some("summary.md".to_string());
        assert!(validate(&config).is_ok());
    }
}
