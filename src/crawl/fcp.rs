use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::{extract_anchors, ArticleRecord, CrawlIndex, FetchOutcome, PageFetcher};
use crate::chassis;
use crate::corpus::SourceType;

const LISTING_URL: &str = "https://www.fcpeuro.com/blog/tag/bmw?page=";
pub const DEFAULT_PAGES: u32 = 36;

/// Walk the paginated blog listing and classify every /blog/ link by its
/// url text. A failed page is logged and skipped -- it never aborts the
/// crawl of subsequent pages, and nothing is retried.
pub async fn crawl<F: PageFetcher>(fetcher: &F, pages: u32) -> CrawlIndex {
    let mut index = CrawlIndex::new();

    let pb = ProgressBar::new(pages as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap()
            .progress_chars("=> "),
    );

    for page in 1..=pages {
        let page_url = format!("{}{}", LISTING_URL, page);
        match fetcher.fetch(&page_url).await {
            FetchOutcome::Success(html) => index_listing_page(&html, &page_url, &mut index),
            FetchOutcome::Transient(reason) => {
                warn!("skipping listing page {}: {}", page, reason);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("found {} blog articles", index.len());
    index
}

/// Classify one listing page. The url is the candidate text here; anchor
/// text on this site is just the article headline image alt.
fn index_listing_page(html: &str, page_url: &str, index: &mut CrawlIndex) {
    for anchor in extract_anchors(html, page_url) {
        if !anchor.href.contains("/blog/") {
            continue;
        }
        if let Some(code) = chassis::resolve(&anchor.href) {
            index.insert(
                anchor.href.clone(),
                ArticleRecord {
                    url: anchor.href,
                    code,
                    source: SourceType::ExpertGuide,
                },
            );
        }
    }
}

// ── Tests ──
