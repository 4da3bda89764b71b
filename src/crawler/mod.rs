//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` capability
//! - HTML tokenizing and link extraction
//! - Frontier scheduling under a worker bound
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod task;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher};
pub use parser::{
    extract_links, ExtractionError, HtmlTokenizer, Tag, TagStream, TokenizeError, Tokenizer,
    DEFAULT_MAX_DOCUMENT_BYTES,
};
pub use scheduler::{ScheduledFetch, Scheduler};
pub use task::{run_fetch_task, TaskFailure};

use crate::config::Config;
use crate::output::CrawlResult;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client from `config`
/// 2. Seed the frontier with `root`
/// 3. Fetch pages and follow their same-host links
/// 4. Return every page crawled before the frontier ran dry or `cancel` fired
///
/// # Arguments
///
/// * `root` - The URL the crawl starts from
/// * `config` - The crawler configuration
/// * `cancel` - Stops dispatch of new fetches when cancelled
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl finished, possibly early
/// * `Err(CrawlError)` - Crawl could not start
pub async fn crawl(
    root: &str,
    config: &Config,
    cancel: CancellationToken,
) -> crate::Result<CrawlResult> {
    Coordinator::from_config(config)?.start(root, cancel).await
}
