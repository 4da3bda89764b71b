//! Fetch task: the unit of crawl work
//!
//! A task fetches one URL and extracts its links. It never touches crawl
//! state; its outcome is reported back to the coordinator.

use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::parser::{extract_links, ExtractionError, Tokenizer};
use crate::output::Page;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Why a fetch task produced no page
#[derive(Debug, Error)]
pub enum TaskFailure {
    #[error(transparent)]
    Fetch(FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Crawl cancelled before {url} was fetched")]
    Cancelled { url: String },
}

impl TaskFailure {
    /// Short tag used in logs and reports
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch-error",
            Self::Extraction(_) => "parse-error",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

impl From<FetchError> for TaskFailure {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Cancelled { url } => Self::Cancelled { url },
            other => Self::Fetch(other),
        }
    }
}

/// Fetches `url` and extracts its links
///
/// # Returns
///
/// * `Ok(Page)` - The page and its crawlable links
/// * `Err(TaskFailure)` - The page is dropped; nothing is recorded for it
pub async fn run_fetch_task(
    url: Url,
    fetcher: &dyn Fetcher,
    tokenizer: &dyn Tokenizer,
    cancel: &CancellationToken,
) -> Result<Page, TaskFailure> {
    if cancel.is_cancelled() {
        return Err(TaskFailure::Cancelled {
            url: url.to_string(),
        });
    }

    let body = fetcher.fetch(&url, cancel).await?;
    let links = extract_links(tokenizer, &url, &body)?;

    Ok(Page::new(url, links))
}
