//! Result aggregation
//!
//! Completed pages are folded into a `ResultAggregator` in the order their
//! fetch tasks finish; `finish` freezes it into the `CrawlResult` handed back
//! to the caller.

use crate::crawler::TaskFailure;
use crate::output::stats::CrawlStats;
use chrono::Utc;
use url::Url;

/// A successfully crawled page and the crawlable links found on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Normalized absolute URL of the page
    pub url: Url,

    /// Normalized absolute URLs linked from the page, in document order
    pub links: Vec<Url>,
}

impl Page {
    pub fn new(url: Url, links: Vec<Url>) -> Self {
        Self { url, links }
    }

    /// Link URLs as strings
    pub fn link_strs(&self) -> Vec<&str> {
        self.links.iter().map(Url::as_str).collect()
    }
}

/// Everything a crawl produced
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Pages in completion order
    pub pages: Vec<Page>,

    pub stats: CrawlStats,
}

impl CrawlResult {
    /// Looks up a crawled page by its URL
    pub fn page(&self, url: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.url.as_str() == url)
    }

    /// URLs of every crawled page, in completion order
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|page| page.url.as_str())
    }

    /// True when the crawl stopped with work left in the frontier
    pub fn is_partial(&self) -> bool {
        self.stats.interrupted
    }
}

/// Collects fetch task outcomes while a crawl runs
#[derive(Debug)]
pub struct ResultAggregator {
    pages: Vec<Page>,
    stats: CrawlStats,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            stats: CrawlStats::started_now(),
        }
    }

    pub fn record_page(&mut self, page: Page) {
        self.stats.pages_crawled += 1;
        self.stats.links_recorded += page.links.len();
        self.pages.push(page);
    }

    pub fn record_failure(&mut self, failure: &TaskFailure) {
        match failure {
            TaskFailure::Fetch(_) => self.stats.fetch_errors += 1,
            TaskFailure::Extraction(_) => self.stats.parse_errors += 1,
            TaskFailure::Cancelled { .. } => self.stats.cancelled_tasks += 1,
        }
    }

    /// A task that ended without reporting an outcome (it panicked)
    pub fn record_aborted(&mut self) {
        self.stats.aborted_tasks += 1;
    }

    pub fn pages_crawled(&self) -> usize {
        self.pages.len()
    }

    /// Freezes the aggregator into the final crawl result
    ///
    /// # Arguments
    ///
    /// * `frontier_remaining` - Frontier entries that were never dispatched
    /// * `pending` - The pending counter when the crawl stopped
    pub fn finish(mut self, frontier_remaining: usize, pending: usize) -> CrawlResult {
        self.stats.frontier_remaining = frontier_remaining;
        self.stats.pending = pending;
        self.stats.interrupted = frontier_remaining > 0;
        self.stats.finished_at = Utc::now();

        CrawlResult {
            pages: self.pages,
            stats: self.stats,
        }
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}
