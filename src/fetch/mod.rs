// src/fetch/mod.rs
// =============================================================================
// This module defines how the crawler gets pages.
//
// The crawler never talks to the network itself. It calls a Fetcher, which
// turns one URL into a page body plus the URLs that page links to.
//
// Implementations:
// - canned: In-memory pages, for the demo command and for tests
// - http: Real HTTP fetching with reqwest, extracting links from HTML/Markdown
// - links: The link extraction helpers the HTTP fetcher uses
// =============================================================================

mod canned;
mod http;
mod links;

use async_trait::async_trait;

use crate::error::FetchError;

pub use canned::CannedFetcher;
pub use http::HttpFetcher;
pub use links::{extract_html_links, extract_markdown_links};

// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub body: String,
    /// Child URLs in the order they appear on the page
    pub links: Vec<String>,
}

impl FetchedPage {
    pub fn new(body: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            body: body.into(),
            links,
        }
    }
}

// Resolves a URL to its content and child URLs
//
// The crawler calls fetch() from many tasks at once, each with a different
// URL, so implementations must be Send + Sync and synchronize any state they
// keep themselves.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
