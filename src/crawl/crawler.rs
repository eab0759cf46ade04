// src/crawl/crawler.rs
// =============================================================================
// This module implements the concurrent, depth-bounded crawl.
//
// How it works (visit(url, remaining_depth)):
// 1. Claim the URL in the shared VisitedSet; if someone else already has it,
//    stop. Nothing else about a duplicate matters, not even its depth.
// 2. If no depth budget is left, record the URL as depth-exhausted and stop.
// 3. If the crawl was cancelled, record the URL as cancelled and stop.
// 4. Fetch the page. A failure is recorded for this URL and ends this branch
//    only; siblings keep going.
// 5. Record the page, then spawn one task per child link, each registered on
//    a CompletionBarrier that belongs to this visit alone.
// 6. Wait for that barrier to drain before returning.
//
// Because every visit waits for its own children, the outermost visit
// returns only when the whole reachable, depth-permitted graph is done.
//
// Rust concepts:
// - Arc: One Traversal shared by every spawned task
// - BoxFuture: An async fn cannot call itself directly, so visit() returns
//   a boxed future
// - tokio::spawn: Runs each child on the multi-threaded runtime
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::barrier::CompletionBarrier;
use super::report::{CrawlReport, PageOutcome};
use super::visited::VisitedSet;
use crate::config::CrawlConfig;
use crate::error::FetchError;
use crate::fetch::{FetchedPage, Fetcher};

// Crawls from `start` up to `max_depth` link hops with default settings
//
// Example:
//   max_depth=1: Only fetch the starting page
//   max_depth=2: Fetch the starting page + all pages it links to
pub async fn crawl<F>(start: &str, max_depth: usize, fetcher: Arc<F>) -> CrawlReport
where
    F: Fetcher + 'static,
{
    Crawler::with_config(fetcher, CrawlConfig::new(max_depth))
        .run(start)
        .await
}

pub struct Crawler<F> {
    fetcher: Arc<F>,
    config: CrawlConfig,
    cancel: CancellationToken,
}

impl<F> Crawler<F>
where
    F: Fetcher + 'static,
{
    pub fn new(fetcher: Arc<F>) -> Self {
        Self::with_config(fetcher, CrawlConfig::default())
    }

    pub fn with_config(fetcher: Arc<F>, config: CrawlConfig) -> Self {
        Self {
            fetcher,
            config,
            cancel: CancellationToken::new(),
        }
    }

    // Uses an external token, so the caller can stop the crawl early
    // (for example on Ctrl-C). Pages claimed after cancellation are reported
    // as cancelled instead of being fetched. The crawl itself never cancels
    // this token; fail-fast only cancels the run's own child token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    // Runs a full traversal from `start` and returns its report
    pub async fn run(&self, start: &str) -> CrawlReport {
        info!(start, max_depth = self.config.max_depth, "starting crawl");

        // Each run gets its own child token: an outside cancel reaches it,
        // but a fail-fast cancel stays inside this run.
        let traversal = Arc::new(Traversal {
            fetcher: Arc::clone(&self.fetcher),
            visited: VisitedSet::new(),
            report: Mutex::new(CrawlReport::new()),
            cancel: self.cancel.child_token(),
            fail_fast: self.config.fail_fast,
        });

        Arc::clone(&traversal)
            .visit(start.to_string(), self.config.max_depth)
            .await;

        // Every task has dropped its WorkGuard by now, but some may still
        // hold an Arc<Traversal> while they unwind, so take the report
        // instead of unwrapping the Arc.
        let report = std::mem::take(&mut *traversal.lock_report());

        info!(
            claimed = traversal.visited.len(),
            fetched = report.fetched_count(),
            failed = report.failure_count(),
            "crawl finished"
        );

        report
    }
}

// State shared by every task of one traversal
struct Traversal<F> {
    fetcher: Arc<F>,
    visited: VisitedSet,
    report: Mutex<CrawlReport>,
    cancel: CancellationToken,
    fail_fast: bool,
}

impl<F> Traversal<F>
where
    F: Fetcher + 'static,
{
    fn visit(self: Arc<Self>, url: String, remaining_depth: usize) -> BoxFuture<'static, ()> {
        async move {
            if !self.visited.try_mark(&url) {
                debug!(url = %url, "already claimed, skipping");
                return;
            }

            // Checked after the claim: a URL first reached with no budget
            // stays claimed even if a shorter path to it shows up later.
            if remaining_depth == 0 {
                debug!(url = %url, "depth limit reached");
                self.record(url, PageOutcome::DepthExhausted);
                return;
            }

            if self.cancel.is_cancelled() {
                debug!(url = %url, "crawl cancelled, not fetching");
                self.record(url, PageOutcome::Cancelled);
                return;
            }

            let fetched = AssertUnwindSafe(self.fetcher.fetch(&url))
                .catch_unwind()
                .await
                .unwrap_or(Err(FetchError::Panicked));

            let page = match fetched {
                Ok(page) => page,
                Err(error) => {
                    warn!(url = %url, %error, "fetch failed");
                    self.record(url, PageOutcome::Failed { error: error.to_string() });
                    if self.fail_fast && !self.cancel.is_cancelled() {
                        warn!("fail-fast enabled, cancelling the rest of the crawl");
                        self.cancel.cancel();
                    }
                    return;
                }
            };

            let FetchedPage { body, links } = page;
            debug!(url = %url, depth = remaining_depth, links = links.len(), "found page");

            self.record(
                url,
                PageOutcome::Fetched {
                    body,
                    links: links.clone(),
                },
            );

            let barrier = CompletionBarrier::new();
            for child in links {
                let work = barrier.register_one();
                let traversal = Arc::clone(&self);
                tokio::spawn(async move {
                    let _work = work;
                    traversal.visit(child, remaining_depth - 1).await;
                });
            }

            barrier.await_all().await;
        }
        .boxed()
    }

    fn record(&self, url: String, outcome: PageOutcome) {
        if !self.lock_report().record(url.clone(), outcome) {
            // Only the task that won try_mark() records a URL
            warn!(url = %url, "duplicate report entry ignored");
        }
    }

    fn lock_report(&self) -> MutexGuard<'_, CrawlReport> {
        self.report.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
