// src/crawl/mod.rs
// =============================================================================
// This module handles crawling.
//
// Submodules:
// - visited: The set of URLs already claimed by some task
// - barrier: The join primitive each crawl step waits on for its children
// - crawler: The recursive, concurrent, depth-bounded traversal
// - report: What the traversal returns, one outcome per claimed URL
//
// Rust concepts:
// - pub use: Re-export items so callers write `crawl::Crawler`, not
//   `crawl::crawler::Crawler`
// =============================================================================

mod barrier;
mod crawler;
mod report;
mod visited;

pub use barrier::{BarrierHandle, CompletionBarrier, WorkGuard};
pub use crawler::{crawl, Crawler};
pub use report::{CrawlReport, PageOutcome};
pub use visited::VisitedSet;
