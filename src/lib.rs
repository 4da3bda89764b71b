//! Sitegraph: a single-host site mapper
//!
//! This crate crawls a website from a root page, following only the links that
//! stay on the host of the page they were found on, and returns every reachable
//! page together with its outbound links.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitegraph operations
///
/// Per-page and per-link failures never surface here; they are absorbed by the
/// crawl and only show up in logs and [`output::CrawlStats`].
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid seed URL '{url}': {source}")]
    InvalidSeedUrl { url: String, source: UrlError },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
///
/// When returned by [`url::normalize_link`] every variant means "not
/// crawlable" and names the rule that rejected the link.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Path contains a parent-directory segment: {0}")]
    ParentTraversal(String),

    #[error("Path names a file resource: {0}")]
    FileExtension(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Link to {found} leaves host {expected}")]
    CrossHost { expected: String, found: String },

    #[error("Link has an empty or root path")]
    EmptyPath,
}

/// Result type alias for Sitegraph operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator};
pub use output::{CrawlResult, CrawlStats, Page};
pub use state::CrawlState;
pub use crate::url::{normalize_link, parse_seed};
