// src/fetch/canned.rs
// =============================================================================
// An in-memory Fetcher that serves a fixed set of pages.
//
// Used by the `demo` command and throughout the tests. It also counts how
// many times each URL was fetched, which is how the tests prove that every
// page is fetched exactly once.
// =============================================================================

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{FetchedPage, Fetcher};
use crate::error::FetchError;

#[derive(Debug, Default)]
pub struct CannedFetcher {
    pages: HashMap<String, FetchedPage>,
    fetches: Mutex<HashMap<String, usize>>,
    /// Simulated network latency per fetch
    latency: Option<Duration>,
}

impl CannedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds a page; URLs without a page answer with FetchError::NotFound
    pub fn with_page(mut self, url: &str, body: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchedPage::new(body, links.iter().map(|l| l.to_string()).collect()),
        );
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    // The four golang.org pages from the Go tour's web crawler exercise.
    // https://golang.org/cmd/ is linked but missing, so it fails with "not found".
    pub fn golang_tour() -> Self {
        Self::new()
            .with_page(
                "https://golang.org/",
                "The Go Programming Language",
                &["https://golang.org/pkg/", "https://golang.org/cmd/"],
            )
            .with_page(
                "https://golang.org/pkg/",
                "Packages",
                &[
                    "https://golang.org/",
                    "https://golang.org/cmd/",
                    "https://golang.org/pkg/fmt/",
                    "https://golang.org/pkg/os/",
                ],
            )
            .with_page(
                "https://golang.org/pkg/fmt/",
                "Package fmt",
                &["https://golang.org/", "https://golang.org/pkg/"],
            )
            .with_page(
                "https://golang.org/pkg/os/",
                "Package os",
                &["https://golang.org/", "https://golang.org/pkg/"],
            )
    }

    // How many times fetch() was called for `url`
    pub fn fetch_count(&self, url: &str) -> usize {
        self.lock_fetches().get(url).copied().unwrap_or(0)
    }

    // Total fetch() calls across all URLs
    pub fn total_fetches(&self) -> usize {
        self.lock_fetches().values().sum()
    }

    fn lock_fetches(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        self.fetches.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        *self.lock_fetches().entry(url.to_string()).or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_pages() {
        let fetcher = CannedFetcher::golang_tour();

        let page = fetcher.fetch("https://golang.org/pkg/fmt/").await.unwrap();
        assert_eq!(page.body, "Package fmt");
        assert_eq!(page.links.len(), 2);

        let err = fetcher.fetch("https://golang.org/cmd/").await.unwrap_err();
        assert_eq!(err, FetchError::NotFound("https://golang.org/cmd/".to_string()));

        assert_eq!(fetcher.fetch_count("https://golang.org/cmd/"), 1);
        assert_eq!(fetcher.total_fetches(), 2);
    }
}
