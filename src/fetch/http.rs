// src/fetch/http.rs
// =============================================================================
// A Fetcher that downloads pages over HTTP.
//
// How it works:
// 1. GET the URL with a shared reqwest Client (connection pooling, timeout,
//    limited redirects)
// 2. Treat any non-2xx status as a fetch error
// 3. Extract child links from the body: Markdown if the server says so (or
//    the path ends in .md), HTML otherwise
// 4. Optionally keep only links on the start URL's host, so the crawl does
//    not wander off across the whole web
// =============================================================================

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use super::links::{extract_html_links, extract_markdown_links};
use super::{FetchedPage, Fetcher};
use crate::config::CrawlConfig;
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    /// When set, only links on this host are returned as children
    allowed_host: Option<String>,
}

impl HttpFetcher {
    // Builds a fetcher that follows links anywhere
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            client,
            allowed_host: None,
        })
    }

    // Builds a fetcher for a crawl starting at `start_url`, restricted to
    // its host when the config asks for it
    pub fn for_start_url(start_url: &str, config: &CrawlConfig) -> Result<Self, FetchError> {
        let start = parse_url(start_url)?;
        let mut fetcher = Self::new(config)?;

        if config.same_domain_only {
            let host = start.host_str().ok_or_else(|| FetchError::InvalidUrl {
                url: start_url.to_string(),
                reason: "URL has no host".to_string(),
            })?;
            fetcher.allowed_host = Some(host.to_string());
        }

        Ok(fetcher)
    }

    fn is_allowed(&self, link: &str) -> bool {
        match &self.allowed_host {
            None => true,
            Some(host) => Url::parse(link)
                .map(|url| url.host_str() == Some(host.as_str()))
                .unwrap_or(false),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = parse_url(url)?;

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let is_markdown = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/markdown"))
            .unwrap_or(false)
            || parsed.path().ends_with(".md");

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let links = if is_markdown {
            extract_markdown_links(&body, url)
        } else {
            extract_html_links(&body, url)
        };

        let links = links.into_iter().filter(|l| self.is_allowed(l)).collect();

        Ok(FetchedPage { body, links })
    }
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
