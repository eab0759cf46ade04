// src/fetch/links.rs
// =============================================================================
// This module extracts child URLs from fetched pages.
//
// We use:
// - `scraper` to parse HTML and find <a href> elements with a CSS selector
// - `pulldown-cmark` to walk Markdown link events
// - `url` to resolve relative links against the page they appear on
//
// Every returned link is absolute, http(s), without a #fragment, and listed
// once per page in the order it first appears. Dropping the fragment matters
// for the crawl: /docs#intro and /docs#usage are the same page and must map
// to the same identifier in the VisitedSet.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

// Extracts all crawlable links from HTML content
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   page_url = "https://example.com"
//   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str, page_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        tracing::warn!(page_url, "invalid base URL, skipping link extraction");
        return Vec::new();
    };
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let hrefs = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"));

    collect_links(&base, hrefs)
}

// Extracts all crawlable links from Markdown text
//
// Example:
//   markdown = "See [the docs](/docs) and [Rust](https://www.rust-lang.org)"
//   page_url = "https://example.com/README.md"
//   result = ["https://example.com/docs", "https://www.rust-lang.org/"]
pub fn extract_markdown_links(markdown: &str, page_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        tracing::warn!(page_url, "invalid base URL, skipping link extraction");
        return Vec::new();
    };

    // In pulldown-cmark 0.9, Link is Tag::Link(link_type, dest_url, title)
    let destinations: Vec<String> = Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::Link(_link_type, dest_url, _title)) => Some(dest_url.to_string()),
            _ => None,
        })
        .collect();

    collect_links(&base, destinations.iter().map(String::as_str))
}

fn collect_links<'a>(base: &Url, hrefs: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    hrefs
        .filter_map(|href| resolve_link(base, href))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

// Resolves a link (possibly relative) to an absolute, fragment-free http(s) URL
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    // Skip anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    // join() handles absolute hrefs too: an href with its own scheme
    // replaces the base entirely
    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);

    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_html_links(html, "https://example.com");
        assert_eq!(links, vec!["https://www.rust-lang.org/"]);
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let links = extract_html_links(html, "https://example.com/page");
        assert_eq!(links, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r##"
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+15551234">Call</a>
            <a href="javascript:void(0)">Nothing</a>
            <a href="#section">Anchor</a>
            <a href="ftp://example.com/file">FTP</a>
        "##;
        let links = extract_html_links(html, "https://example.com");
        assert!(links.is_empty());
    }

    #[test]
    fn test_fragments_collapse_to_one_page() {
        let html = r#"
            <a href="/docs#intro">Intro</a>
            <a href="/docs#usage">Usage</a>
            <a href="../about">About</a>
        "#;
        let links = extract_html_links(html, "https://example.com/page/");
        assert_eq!(
            links,
            vec!["https://example.com/docs", "https://example.com/about"]
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let links = extract_html_links(r#"<a href="/docs">Docs</a>"#, "not a url");
        assert!(links.is_empty());
    }

    #[test]
    fn test_extract_markdown_links() {
        let markdown = "Check out [Rust](https://www.rust-lang.org) and [the docs](docs/intro.md).\n\
                        Mail [me](mailto:me@example.com).";
        let links = extract_markdown_links(markdown, "https://example.com/README.md");
        assert_eq!(
            links,
            vec![
                "https://www.rust-lang.org/",
                "https://example.com/docs/intro.md"
            ]
        );
    }
}
