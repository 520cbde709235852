//! Job posting page fetcher.
//!
//! Fetches a posting URL and reduces the HTML to plain text for the
//! tailoring prompt. Pages are cached by URL in the injected TTL cache.
//! Site-specific extraction heuristics are deliberately out of scope; the
//! reduction here is generic body text.

use std::sync::Arc;
use std::time::Duration;

use scraper::{Html, Selector};
use tracing::info;

use crate::cache::TtlCache;
use crate::errors::AppError;

const FETCH_TIMEOUT_SECS: u64 = 20;
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Upper bound on text handed to the tailoring prompt.
const MAX_TEXT_CHARS: usize = 20_000;

pub type PageCache = TtlCache<String, String>;

/// Builds the page cache with the policy used in production: 15 minutes,
/// bounded to 256 pages.
pub fn default_page_cache() -> PageCache {
    TtlCache::new(Duration::from_secs(15 * 60), 256)
}

#[derive(Clone)]
pub struct JobPageClient {
    client: reqwest::Client,
    cache: Arc<PageCache>,
}

impl JobPageClient {
    pub fn new(cache: Arc<PageCache>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            cache,
        }
    }

    /// Returns the posting's plain text, served from cache when fresh.
    pub async fn fetch_text(&self, url: &str) -> Result<String, AppError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Validation(format!("Invalid job URL: {url}")));
        }

        if let Some(cached) = self.cache.get(&url.to_string()) {
            info!("Job page cache hit: {url}");
            return Ok(cached);
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to fetch job page: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Job page returned {status} for {url}"
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read job page body: {e}")))?;

        let text = html_to_text(&html);
        if text.is_empty() {
            return Err(AppError::Upstream(format!(
                "Job page at {url} contained no readable text"
            )));
        }

        self.cache.insert(url.to_string(), text.clone());
        Ok(text)
    }
}

/// Generic HTML → text reduction: script/style stripped, whitespace
/// collapsed, capped at [`MAX_TEXT_CHARS`].
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = Selector::parse("body").expect("static selector");

    let text = match document.select(&root).next() {
        Some(body) => collect_text(body),
        None => collect_text(document.root_element()),
    };

    text.chars().take(MAX_TEXT_CHARS).collect()
}

fn collect_text(element: scraper::ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in element.descendants() {
        if let scraper::node::Node::Text(text) = node.value() {
            let in_skipped_subtree = node.ancestors().any(|ancestor| {
                matches!(
                    ancestor.value(),
                    scraper::node::Node::Element(el)
                        if matches!(el.name(), "script" | "style" | "noscript")
                )
            });
            if !in_skipped_subtree {
                parts.push(&text.text);
            }
        }
    }

    parts
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_strips_markup_and_scripts() {
        let html = r#"<html><head><style>.x{color:red}</style></head>
            <body><h1>Rust Engineer</h1><script>var x = 1;</script>
            <p>Build  backend   services.</p></body></html>"#;
        let text = html_to_text(html);
        assert!(text.contains("Rust Engineer"));
        assert!(text.contains("Build backend services."));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color:red"));
    }

    #[test]
    fn test_html_to_text_collapses_whitespace() {
        let text = html_to_text("<body><p>a\n\n   b</p></body>");
        assert_eq!(text, "a b");
    }
}
