// src/config.rs
// =============================================================================
// Crawl configuration.
//
// CrawlConfig holds every knob the crawler and the HTTP fetcher read. The CLI
// builds one from its flags; library users start from CrawlConfig::default()
// and chain the with_*() builder methods.
// =============================================================================

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// How many link hops to follow; the start URL is fetched when this is >= 1
    pub max_depth: usize,
    /// Cancel the rest of the crawl after the first failed fetch
    pub fail_fast: bool,
    /// Per-request timeout for HttpFetcher
    pub request_timeout: Duration,
    /// Redirects HttpFetcher follows before giving up
    pub max_redirects: usize,
    /// Only follow links on the start URL's domain
    pub same_domain_only: bool,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            fail_fast: false,
            request_timeout: Duration::from_secs(10),
            max_redirects: 5,
            same_domain_only: true,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CrawlConfig {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_same_domain_only(mut self, same_domain_only: bool) -> Self {
        self.same_domain_only = same_domain_only;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = CrawlConfig::new(2)
            .with_fail_fast(true)
            .with_request_timeout(Duration::from_secs(3))
            .with_same_domain_only(false);

        assert_eq!(config.max_depth, 2);
        assert!(config.fail_fast);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert!(!config.same_domain_only);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_default_user_agent_names_crate() {
        assert!(CrawlConfig::default().user_agent.starts_with("fanout-crawler/"));
    }
}
