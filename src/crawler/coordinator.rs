//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop. The loop is the only code that
//! touches the frontier, the visited set and the pending counter:
//! - Frontier entries are dispatched as fetch tasks while worker slots are free
//! - Task outcomes come back through the `JoinSet` and are folded in one at a time
//! - Cancellation stops dispatch and lets in-flight tasks finish
//! - The crawl ends when nothing is queued or in flight

use crate::config::Config;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::{HtmlTokenizer, Tokenizer};
use crate::crawler::scheduler::{ScheduledFetch, Scheduler};
use crate::crawler::task::{run_fetch_task, TaskFailure};
use crate::output::{CrawlResult, Page, ResultAggregator};
use crate::state::CrawlState;
use crate::url::parse_seed;
use crate::CrawlError;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// How often (in completed tasks) progress is logged
const PROGRESS_INTERVAL: usize = 10;

/// What a fetch task hands back to the coordinator
struct Completion {
    url: Url,
    outcome: Result<Page, TaskFailure>,
}

/// Main crawler coordinator structure
///
/// A coordinator holds only its capabilities and worker bound; every call to
/// [`Coordinator::start`] runs an independent crawl.
pub struct Coordinator {
    max_workers: usize,
    fetcher: Arc<dyn Fetcher>,
    tokenizer: Arc<dyn Tokenizer>,
}

/// Mutable state of one crawl, owned by the loop in `start`
struct CrawlRun {
    state: CrawlState,
    scheduler: Scheduler,
    aggregator: ResultAggregator,
    tasks: JoinSet<Completion>,
    completed: usize,
    started: Instant,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `max_workers` - Upper bound on fetch tasks running at once (at least 1)
    /// * `fetcher` - Fetch capability used by every task
    /// * `tokenizer` - Tokenizer capability used for link extraction
    pub fn new(max_workers: usize, fetcher: Arc<dyn Fetcher>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            max_workers: max_workers.max(1),
            fetcher,
            tokenizer,
        }
    }

    /// Creates a coordinator backed by [`HttpFetcher`] and [`HtmlTokenizer`]
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - The HTTP client could not be built
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let fetcher = HttpFetcher::from_config(config)?;
        let tokenizer = HtmlTokenizer::new(config.crawler.max_document_bytes);

        Ok(Self::new(
            config.crawler.max_workers,
            Arc::new(fetcher),
            Arc::new(tokenizer),
        ))
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Crawls everything reachable from `root` and returns what was found
    ///
    /// Returns once the crawl is done: either no work is left, or `cancel`
    /// fired and every in-flight task has finished. A cancelled crawl still
    /// returns `Ok` with the pages completed so far.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The crawled pages and statistics
    /// * `Err(CrawlError)` - `root` is not a usable seed; nothing was fetched
    pub async fn start(&self, root: &str, cancel: CancellationToken) -> crate::Result<CrawlResult> {
        let seed = parse_seed(root).map_err(|source| CrawlError::InvalidSeedUrl {
            url: root.to_string(),
            source,
        })?;

        tracing::info!("Starting crawl of {} with {} workers", seed, self.max_workers);

        let mut run = CrawlRun {
            state: CrawlState::Idle.transition_to(CrawlState::Running)?,
            scheduler: Scheduler::new(self.max_workers),
            aggregator: ResultAggregator::new(),
            tasks: JoinSet::new(),
            completed: 0,
            started: Instant::now(),
        };
        run.scheduler.enqueue(seed);

        loop {
            if run.state.accepts_dispatch() {
                if cancel.is_cancelled() {
                    tracing::info!(
                        "Crawl cancelled, waiting for {} in-flight fetches",
                        run.tasks.len()
                    );
                    run.state = run.state.transition_to(CrawlState::Draining)?;
                } else {
                    self.dispatch(&mut run, &cancel);
                }
            }

            let finished = match run.state {
                // Nothing queued and nothing in flight
                CrawlState::Running => run.scheduler.pending() == 0,
                // In-flight fetches joined; queued URLs are abandoned
                _ => run.tasks.is_empty(),
            };
            if finished {
                break;
            }

            tokio::select! {
                joined = run.tasks.join_next() => match joined {
                    Some(Ok(completion)) => self.fold(&mut run, completion),
                    Some(Err(e)) => {
                        tracing::error!("Fetch task ended without a result: {}", e);
                        run.aggregator.record_aborted();
                        run.scheduler.complete();
                    }
                    None => {
                        tracing::warn!(
                            "No fetches in flight with {} URLs pending",
                            run.scheduler.pending()
                        );
                        break;
                    }
                },
                _ = cancel.cancelled(), if run.state.accepts_dispatch() => {}
            }
        }

        if run.state == CrawlState::Running {
            tracing::info!("Frontier is empty, crawl complete");
            run.state = run.state.transition_to(CrawlState::Draining)?;
        }
        run.state = run.state.transition_to(CrawlState::Done)?;

        let frontier_remaining = run.scheduler.frontier_size();
        let result = run
            .aggregator
            .finish(frontier_remaining, run.scheduler.pending());

        tracing::info!(
            "Crawl {}: {} pages crawled in {:?} ({} URLs seen, {} never fetched)",
            run.state,
            result.stats.pages_crawled,
            run.started.elapsed(),
            run.scheduler.visited_count(),
            frontier_remaining
        );

        Ok(result)
    }

    /// Starts fetch tasks until the frontier or the worker slots run out
    fn dispatch(&self, run: &mut CrawlRun, cancel: &CancellationToken) {
        while !cancel.is_cancelled() {
            let Some(ScheduledFetch { url, permit }) = run.scheduler.next_fetch() else {
                break;
            };

            tracing::debug!(
                "Dispatching {} ({} workers free)",
                url,
                run.scheduler.available_workers()
            );

            let fetcher = Arc::clone(&self.fetcher);
            let tokenizer = Arc::clone(&self.tokenizer);
            let cancel = cancel.clone();

            run.tasks.spawn(async move {
                let outcome =
                    run_fetch_task(url.clone(), fetcher.as_ref(), tokenizer.as_ref(), &cancel).await;
                drop(permit);
                Completion { url, outcome }
            });
        }
    }

    /// Applies one task outcome to the crawl state
    fn fold(&self, run: &mut CrawlRun, completion: Completion) {
        match completion.outcome {
            Ok(page) => {
                let mut discovered = 0;
                for link in &page.links {
                    if run.scheduler.enqueue(link.clone()) {
                        discovered += 1;
                    }
                }
                tracing::debug!(
                    "Crawled {}: {} links, {} new",
                    page.url,
                    page.links.len(),
                    discovered
                );
                run.aggregator.record_page(page);
            }
            Err(failure) => {
                match &failure {
                    TaskFailure::Cancelled { .. } => {
                        tracing::debug!("Skipped {}: {}", completion.url, failure)
                    }
                    _ => tracing::warn!(
                        "Dropping {} ({}): {}",
                        completion.url,
                        failure.tag(),
                        failure
                    ),
                }
                run.aggregator.record_failure(&failure);
            }
        }

        run.scheduler.complete();
        run.completed += 1;

        if run.completed % PROGRESS_INTERVAL == 0 {
            let rate = run.aggregator.pages_crawled() as f64 / run.started.elapsed().as_secs_f64();
            tracing::info!(
                "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                run.aggregator.pages_crawled(),
                run.scheduler.frontier_size(),
                rate
            );
        }
    }
}
