/// Crawl state definitions for the orchestrator lifecycle
///
/// A crawl moves strictly forward: `Idle -> Running -> Draining -> Done`.
use crate::CrawlError;
use std::fmt;

/// Represents the current state of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Created, no seed accepted yet
    Idle,

    /// Frontier entries are being dispatched to fetch tasks
    Running,

    /// No new tasks are dispatched; in-flight tasks are allowed to finish
    Draining,

    /// Terminal; the crawl result is frozen
    Done,
}

impl CrawlState {
    /// Returns true if new fetch tasks may be dispatched in this state
    pub fn accepts_dispatch(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if `next` directly follows this state
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running) | (Self::Running, Self::Draining) | (Self::Draining, Self::Done)
        )
    }

    /// Moves to `next`, rejecting anything but the next state in the lifecycle
    pub fn transition_to(self, next: CrawlState) -> crate::Result<CrawlState> {
        if !self.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self,
                to: next,
            });
        }

        tracing::trace!("Crawl state {} -> {}", self, next);
        Ok(next)
    }

    /// Lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
