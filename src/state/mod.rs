//! State module for tracking crawl progress
//!
//! `CrawlState` is the orchestrator's lifecycle: it decides whether new fetch
//! tasks may still be dispatched and when the crawl result is frozen.

mod crawl_state;

pub use crawl_state::CrawlState;
