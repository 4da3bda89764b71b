//! Scheduler for managing the crawl frontier and concurrency limit
//!
//! This module handles:
//! - FIFO frontier of URLs waiting to be fetched
//! - The visited set that keeps every URL to a single fetch
//! - The pending counter used to detect the end of the crawl
//! - Global concurrency limiting via a semaphore
//!
//! The scheduler is owned by the coordinator's loop and is never shared with
//! fetch tasks, so none of its state needs a lock.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// A URL taken off the frontier together with its worker slot
///
/// The slot is released when the permit is dropped, so the permit has to
/// travel into the task that fetches `url`.
#[derive(Debug)]
pub struct ScheduledFetch {
    /// The URL to fetch
    pub url: Url,

    /// The semaphore permit for this fetch
    pub permit: OwnedSemaphorePermit,
}

/// Scheduler manages the frontier queue and the worker bound
#[derive(Debug)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// URLs discovered but not yet dispatched
    frontier: VecDeque<Url>,

    /// Every URL ever enqueued
    visited: HashSet<String>,

    /// Queued plus in-flight work
    pending: usize,
}

impl Scheduler {
    /// Creates a scheduler allowing `max_workers` fetches at once
    pub fn new(max_workers: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_workers)),
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            pending: 0,
        }
    }

    /// Adds a URL to the frontier unless it was ever enqueued before
    ///
    /// # Returns
    ///
    /// `true` if the URL was new and the pending counter went up by one
    pub fn enqueue(&mut self, url: Url) -> bool {
        if !self.visited.insert(url.as_str().to_string()) {
            return false;
        }

        self.frontier.push_back(url);
        self.pending += 1;
        true
    }

    /// Takes the next URL off the frontier if a worker slot is free
    ///
    /// Never waits: returns `None` when the frontier is empty or all `W`
    /// slots are taken, and the URL stays queued in the latter case.
    pub fn next_fetch(&mut self) -> Option<ScheduledFetch> {
        if self.frontier.is_empty() {
            return None;
        }

        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        let url = self.frontier.pop_front()?;

        Some(ScheduledFetch { url, permit })
    }

    /// Records that a dispatched fetch finished, whatever its outcome
    pub fn complete(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    /// Queued plus in-flight URLs
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Number of distinct URLs ever enqueued
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Free worker slots
    pub fn available_workers(&self) -> usize {
        self.semaphore.available_permits()
    }
}
