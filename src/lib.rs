// src/lib.rs
// =============================================================================
// fanout-crawler: a concurrent, depth-bounded, deduplicating web crawler.
//
// Give it a start URL, a Fetcher and a maximum depth, and it visits every
// reachable page at most once, fetching sibling pages in parallel, and hands
// back a report with one outcome per URL it claimed.
//
// Modules:
// - crawl: VisitedSet, CompletionBarrier, the Crawler and its report
// - fetch: The Fetcher trait plus canned and HTTP implementations
// - config: CrawlConfig
// - error: FetchError
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;

pub use config::CrawlConfig;
pub use crawl::{crawl, CrawlReport, Crawler, PageOutcome};
pub use error::FetchError;
pub use fetch::{CannedFetcher, FetchedPage, Fetcher, HttpFetcher};
