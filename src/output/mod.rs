//! Output module for crawl results and reports
//!
//! This module handles:
//! - Aggregating completed pages into the final crawl result
//! - Recording and printing crawl statistics
//! - Generating markdown summaries of crawl results

mod aggregator;
mod markdown;
pub mod stats;

pub use aggregator::{CrawlResult, Page, ResultAggregator};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_pages, print_statistics, CrawlStats};

use thiserror::Error;

/// Errors that can occur while writing reports
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
