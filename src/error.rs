// src/error.rs
// =============================================================================
// Error types for the crawl library.
//
// FetchError is the only recoverable error in the crawl: a failed fetch ends
// that one branch and is written into the report. It never aborts siblings
// or the crawl as a whole (unless fail-fast is switched on).
//
// Misusing a CompletionBarrier is a bug, not an error, and panics instead.
//
// Rust concepts:
// - thiserror: Derives std::error::Error and Display from attributes
// - Clone: Errors are copied into the report as strings
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The fetcher has no page for this URL
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Server answered with a non-success status (404, 500, ...)
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("could not resolve hostname")]
    Dns,

    #[error("SSL certificate error")]
    Tls,

    #[error("connection failed")]
    Connect,

    #[error("request failed: {0}")]
    Request(String),

    /// The fetcher panicked instead of returning
    #[error("fetcher panicked")]
    Panicked,
}

impl FetchError {
    // Categorizes a reqwest error
    //
    // reqwest errors can happen for many reasons (timeout, DNS resolution
    // failure, certificate issues, redirect loops), and we want the report
    // to say which.
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let error_string = error.to_string().to_lowercase();

        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if let Some(status) = error.status() {
            FetchError::Status {
                status: status.as_u16(),
            }
        } else if error.is_connect() {
            if error_string.contains("dns") {
                FetchError::Dns
            } else {
                FetchError::Connect
            }
        } else if error_string.contains("certificate") || error_string.contains("ssl") {
            FetchError::Tls
        } else {
            FetchError::Request(error.to_string())
        }
    }
}
