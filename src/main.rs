// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr, so --json output on stdout stays clean)
// 3. Build a Fetcher for the chosen subcommand and run the crawl
// 4. Print the report and exit with a proper code
//    (0 = everything fetched, 1 = some pages failed or were cancelled, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use fanout_crawler::{CannedFetcher, CrawlConfig, CrawlReport, Crawler, Fetcher, HttpFetcher, PageOutcome};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.command.config();

    match cli.command {
        Commands::Site { website_url, json, .. } => {
            println!("🔍 Crawling website: {}", website_url);
            println!("📊 Max crawl depth: {}", config.max_depth);

            let fetcher = HttpFetcher::for_start_url(&website_url, &config)
                .with_context(|| format!("cannot crawl {}", website_url))?;
            crawl_and_print(fetcher, config, &website_url, json).await
        }
        Commands::Demo { start, json, .. } => {
            println!("🔍 Crawling demo pages from: {}", start);
            crawl_and_print(CannedFetcher::golang_tour(), config, &start, json).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn crawl_and_print<F>(fetcher: F, config: CrawlConfig, start: &str, json: bool) -> Result<i32>
where
    F: Fetcher + 'static,
{
    // Ctrl-C stops new fetches; pages already in flight still finish and
    // show up in the report
    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, finishing in-flight pages");
                cancel.cancel();
            }
        })
    };

    let report = Crawler::with_config(Arc::new(fetcher), config)
        .with_cancellation(cancel)
        .run(start)
        .await;
    ctrl_c.abort();

    print_report(&report, json)?;

    if report.problem_count() > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report).context("serializing report")?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

fn print_table(report: &CrawlReport) {
    println!();
    for (url, outcome) in report.iter() {
        println!("{}", format_row(url, outcome));
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Fetched: {}", report.fetched_count());
    println!("   ❌ Failed: {}", report.failure_count());
    println!("   📋 Claimed: {}", report.len());
}

// One line per claimed page, e.g. `found: https://golang.org/ "The Go Programming Language"`
fn format_row(url: &str, outcome: &PageOutcome) -> String {
    match outcome {
        PageOutcome::Fetched { body, .. } => format!("found: {} {:?}", url, preview(body, 60)),
        PageOutcome::Failed { error } => format!("failed: {}: {}", url, error),
        PageOutcome::DepthExhausted => format!("depth limit: {}", url),
        PageOutcome::Cancelled => format!("cancelled: {}", url),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

// First characters of a body, on one line
fn preview(body: &str, max: usize) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&flat, max)
}
