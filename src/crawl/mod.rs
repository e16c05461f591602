pub mod fcp;
pub mod guides;
pub mod pelican;

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use scraper::{Html, Selector};
use url::Url;

use crate::corpus::SourceType;

/// One classified article reference. Identity is the url; re-discovery
/// within a crawl overwrites the record (last write wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub url: String,
    pub code: &'static str,
    pub source: SourceType,
}

/// url -> record for one site. Append/overwrite only, never pruned
/// mid-crawl; BTreeMap keeps downstream iteration deterministic.
pub type CrawlIndex = BTreeMap<String, ArticleRecord>;

/// Result of one bounded network fetch. Failures are data, not errors:
/// crawler logic branches on the value, and a bad page can never abort the
/// surrounding crawl.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(String),
    Transient(String),
}

/// The page-fetch boundary. `fetch` returns a page body, `probe` checks
/// liveness without downloading one. Implementations must not retry; a
/// failed url is treated as absent for the run.
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome;
    async fn probe(&self, url: &str) -> bool;
}

/// reqwest-backed fetcher with a bounded per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        match self.client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => FetchOutcome::Success(body),
                Err(e) => FetchOutcome::Transient(format!("body read failed: {}", e)),
            },
            Ok(resp) => FetchOutcome::Transient(format!("status {}", resp.status())),
            Err(e) => FetchOutcome::Transient(e.to_string()),
        }
    }

    async fn probe(&self, url: &str) -> bool {
        matches!(
            self.client.head(url).send().await,
            Ok(resp) if resp.status().is_success()
        )
    }
}

/// An `<a href>` with its display text, href absolutized against the page.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// Pull every hyperlink out of a page. Relative hrefs are joined against
/// `base`; unjoinable ones are dropped.
pub fn extract_anchors(html: &str, base: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]").unwrap();
    let base_url = Url::parse(base).ok();

    let mut anchors = Vec::new();
    for element in document.select(&anchor_sel) {
        let href = match element.value().attr("href") {
            Some(h) => h,
            None => continue,
        };
        let text = element.text().collect::<String>().trim().to_string();

        let absolute = if href.starts_with("http") {
            href.to_string()
        } else {
            match base_url.as_ref().and_then(|b| b.join(href).ok()) {
                Some(joined) => joined.to_string(),
                None => continue,
            }
        };
        anchors.push(Anchor {
            href: absolute,
            text,
        });
    }
    anchors
}

// ── Test fetcher ──

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::{FetchOutcome, PageFetcher};

    /// Canned responses keyed by url; unknown urls fail transiently.
    #[derive(Default)]
    pub struct FakeFetcher {
        pub pages: HashMap<String, FetchOutcome>,
        pub live: Vec<String>,
    }

    impl FakeFetcher {
        pub fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages
                .insert(url.to_string(), FetchOutcome::Success(html.to_string()));
            self
        }

        pub fn with_failure(mut self, url: &str, reason: &str) -> Self {
            self.pages
                .insert(url.to_string(), FetchOutcome::Transient(reason.to_string()));
            self
        }
    }

    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> FetchOutcome {
            self.pages
                .get(url)
                .cloned()
                .unwrap_or_else(|| FetchOutcome::Transient("unknown url".to_string()))
        }

        async fn probe(&self, url: &str) -> bool {
            self.live.iter().any(|u| u == url)
        }
    }
}

// ── Tests ──
