// src/crawl/report.rs
// =============================================================================
// This module defines the result of a crawl.
//
// Every URL the crawl claims gets exactly one entry, written once by the task
// that claimed it and never changed afterwards. The report is only handed
// out after the whole traversal has joined, so readers never see a partial
// crawl.
//
// Rust concepts:
// - BTreeMap: A sorted map, so table and JSON output come out in a stable order
// - Enums with data: Each outcome carries exactly the fields it needs
// - Serde: #[derive(Serialize)] for --json output
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

// What happened to a claimed URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    /// Page was fetched; `links` are the child URLs it pointed to
    Fetched { body: String, links: Vec<String> },
    /// The fetcher failed for this URL
    Failed { error: String },
    /// Claimed at the depth limit, so it was never fetched
    DepthExhausted,
    /// Claimed after the crawl was cancelled, so it was never fetched
    Cancelled,
}

impl PageOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, PageOutcome::Fetched { .. })
    }

    // Failed and cancelled pages are both problems worth reporting
    pub fn is_problem(&self) -> bool {
        matches!(self, PageOutcome::Failed { .. } | PageOutcome::Cancelled)
    }
}

// The full traversal report: URL -> outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlReport {
    pages: BTreeMap<String, PageOutcome>,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self::default()
    }

    // Records the outcome for a URL
    //
    // Returns false (and keeps the first outcome) if the URL already has one;
    // the crawler only records URLs it won in the VisitedSet, so a second
    // record means a claim was lost somewhere.
    pub(crate) fn record(&mut self, url: String, outcome: PageOutcome) -> bool {
        match self.pages.entry(url) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(outcome);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, url: &str) -> Option<&PageOutcome> {
        self.pages.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pages.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PageOutcome)> {
        self.pages.iter().map(|(url, outcome)| (url.as_str(), outcome))
    }

    // Pages that were fetched successfully, with their body and links
    pub fn fetched(&self) -> impl Iterator<Item = (&str, &str, &[String])> {
        self.pages.iter().filter_map(|(url, outcome)| match outcome {
            PageOutcome::Fetched { body, links } => {
                Some((url.as_str(), body.as_str(), links.as_slice()))
            }
            _ => None,
        })
    }

    // Pages whose fetch failed, with the error message
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pages.iter().filter_map(|(url, outcome)| match outcome {
            PageOutcome::Failed { error } => Some((url.as_str(), error.as_str())),
            _ => None,
        })
    }

    pub fn fetched_count(&self) -> usize {
        self.pages.values().filter(|o| o.is_fetched()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn problem_count(&self) -> usize {
        self.pages.values().filter(|o| o.is_problem()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(body: &str) -> PageOutcome {
        PageOutcome::Fetched {
            body: body.to_string(),
            links: vec![],
        }
    }

    #[test]
    fn test_first_record_wins() {
        let mut report = CrawlReport::new();
        assert!(report.record("a".to_string(), fetched("first")));
        assert!(!report.record("a".to_string(), PageOutcome::Cancelled));
        assert_eq!(report.get("a"), Some(&fetched("first")));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_counts() {
        let mut report = CrawlReport::new();
        report.record("a".to_string(), fetched("A"));
        report.record(
            "b".to_string(),
            PageOutcome::Failed {
                error: "not found: b".to_string(),
            },
        );
        report.record("c".to_string(), PageOutcome::DepthExhausted);
        report.record("d".to_string(), PageOutcome::Cancelled);

        assert_eq!(report.fetched_count(), 1);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.problem_count(), 2);
        assert_eq!(report.failures().collect::<Vec<_>>(), vec![("b", "not found: b")]);
    }

    #[test]
    fn test_json_shape() {
        let mut report = CrawlReport::new();
        report.record(
            "https://golang.org/".to_string(),
            PageOutcome::Fetched {
                body: "The Go Programming Language".to_string(),
                links: vec!["https://golang.org/pkg/".to_string()],
            },
        );
        report.record("https://golang.org/pkg/".to_string(), PageOutcome::DepthExhausted);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["https://golang.org/"]["status"], "fetched");
        assert_eq!(json["https://golang.org/"]["links"][0], "https://golang.org/pkg/");
        assert_eq!(json["https://golang.org/pkg/"]["status"], "depth_exhausted");
    }
}
