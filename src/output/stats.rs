//! Crawl statistics
//!
//! This module provides the counters gathered while a crawl runs and the
//! functions that print them, and the crawled pages, to stdout.

use crate::output::aggregator::Page;
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// Pages fetched and scanned successfully
    pub pages_crawled: usize,

    /// Links recorded across all crawled pages
    pub links_recorded: usize,

    /// Pages dropped because the fetch failed
    pub fetch_errors: usize,

    /// Pages dropped because link extraction failed
    pub parse_errors: usize,

    /// Tasks that saw the cancellation signal before fetching
    pub cancelled_tasks: usize,

    /// Tasks that ended without an outcome
    pub aborted_tasks: usize,

    /// Frontier entries never dispatched
    pub frontier_remaining: usize,

    /// Queued plus in-flight work left when the crawl stopped
    pub pending: usize,

    /// Whether the crawl stopped before the frontier was exhausted
    pub interrupted: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlStats {
    pub(crate) fn started_now() -> Self {
        let now = Utc::now();
        Self {
            pages_crawled: 0,
            links_recorded: 0,
            fetch_errors: 0,
            parse_errors: 0,
            cancelled_tasks: 0,
            aborted_tasks: 0,
            frontier_remaining: 0,
            pending: 0,
            interrupted: false,
            started_at: now,
            finished_at: now,
        }
    }

    /// Tasks that produced no page
    pub fn failures(&self) -> usize {
        self.fetch_errors + self.parse_errors + self.cancelled_tasks + self.aborted_tasks
    }

    /// Tasks that ran to an outcome
    pub fn attempted(&self) -> usize {
        self.pages_crawled + self.failures()
    }

    /// Percentage of attempted pages that were crawled
    pub fn success_rate(&self) -> f64 {
        let attempted = self.attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_crawled as f64 / attempted as f64) * 100.0
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages crawled: {}", stats.pages_crawled);
    println!("  Links recorded: {}", stats.links_recorded);
    println!(
        "  Duration: {:.2}s",
        stats.duration().num_milliseconds() as f64 / 1000.0
    );
    println!();

    if stats.failures() > 0 {
        println!("Dropped Pages:");
        println!("  fetch-error: {}", stats.fetch_errors);
        println!("  parse-error: {}", stats.parse_errors);
        println!("  cancelled: {}", stats.cancelled_tasks);
        if stats.aborted_tasks > 0 {
            println!("  aborted: {}", stats.aborted_tasks);
        }
        println!();
    }

    if stats.interrupted {
        println!(
            "Crawl interrupted with {} URLs left in the frontier",
            stats.frontier_remaining
        );
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages crawled)",
        stats.success_rate(),
        stats.pages_crawled,
        stats.attempted()
    );
}

/// Prints each page and its links, up to `limit` pages
pub fn print_pages(pages: &[Page], limit: Option<usize>) {
    let shown = limit.unwrap_or(pages.len()).min(pages.len());

    for page in &pages[..shown] {
        println!("Page {} has links: {:?}", page.url, page.link_strs());
    }

    if shown < pages.len() {
        println!("... and {} more pages", pages.len() - shown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut stats = CrawlStats::started_now();
        assert_eq!(stats.success_rate(), 0.0);

        stats.pages_crawled = 3;
        stats.fetch_errors = 1;
        assert_eq!(stats.attempted(), 4);
        assert!((stats.success_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failures_sum_every_kind() {
        let mut stats = CrawlStats::started_now();
        stats.fetch_errors = 1;
        stats.parse_errors = 2;
        stats.cancelled_tasks = 3;
        stats.aborted_tasks = 4;
        assert_eq!(stats.failures(), 10);
    }

    #[test]
    fn test_duration_is_never_negative() {
        let stats = CrawlStats::started_now();
        assert!(stats.duration() >= chrono::Duration::zero());
    }
}
