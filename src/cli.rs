// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - site: Crawl a real website over HTTP
// - demo: Crawl a built-in set of canned pages (no network needed)
//
// Rust concepts:
// - Derive macros: #[derive(Parser)] generates the argument parsing code
// - Enums: One variant per subcommand, holding that subcommand's arguments
// =============================================================================

use clap::{Parser, Subcommand};
use std::time::Duration;

use fanout_crawler::CrawlConfig;

#[derive(Parser, Debug)]
#[command(
    name = "fanout-crawler",
    version,
    about = "Crawl a website concurrently, visiting every page at most once",
    long_about = "fanout-crawler follows links from a starting URL up to a maximum depth, \
                  fetching sibling pages in parallel and never fetching the same page twice."
)]
pub struct Cli {
    /// Show debug logs (overridden by RUST_LOG when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website starting from a URL
    ///
    /// Example: fanout-crawler site https://example.com --max-depth 3
    Site {
        /// Website URL to start from (e.g., https://example.com)
        website_url: String,

        /// Output the crawl report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Maximum crawl depth
        ///
        /// Depth 1 = just the starting page
        /// Depth 2 = starting page + all pages it links to
        /// etc.
        #[arg(long, default_value_t = 2)]
        max_depth: usize,

        /// Follow links to other domains too
        #[arg(long)]
        all_domains: bool,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// Stop fetching new pages after the first failure
        #[arg(long)]
        fail_fast: bool,

        /// Redirects to follow before a page counts as failed
        #[arg(long, default_value_t = 5)]
        max_redirects: usize,

        /// User-Agent header sent with every request
        #[arg(long)]
        user_agent: Option<String>,
    },

    /// Crawl the built-in golang.org demo pages
    ///
    /// Example: fanout-crawler demo --max-depth 4
    Demo {
        /// URL to start from
        #[arg(long, default_value = "https://golang.org/")]
        start: String,

        /// Output the crawl report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Maximum crawl depth
        #[arg(long, default_value_t = 4)]
        max_depth: usize,

        /// Stop fetching new pages after the first failure
        #[arg(long)]
        fail_fast: bool,
    },
}

impl Commands {
    // Builds the crawl configuration from this subcommand's flags
    pub fn config(&self) -> CrawlConfig {
        match self {
            Commands::Site {
                max_depth,
                all_domains,
                timeout_secs,
                fail_fast,
                max_redirects,
                user_agent,
                ..
            } => {
                let config = CrawlConfig::new(*max_depth)
                    .with_same_domain_only(!*all_domains)
                    .with_request_timeout(Duration::from_secs(*timeout_secs))
                    .with_max_redirects(*max_redirects)
                    .with_fail_fast(*fail_fast);
                match user_agent {
                    Some(agent) => config.with_user_agent(agent.as_str()),
                    None => config,
                }
            }
            Commands::Demo {
                max_depth,
                fail_fast,
                ..
            } => CrawlConfig::default()
                .with_max_depth(*max_depth)
                .with_fail_fast(*fail_fast),
        }
    }
}
