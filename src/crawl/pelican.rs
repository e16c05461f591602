use std::collections::BTreeSet;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::{extract_anchors, ArticleRecord, CrawlIndex, FetchOutcome, PageFetcher};
use crate::chassis;
use crate::corpus::SourceType;

const MASTER_URL: &str = "https://www.pelicanparts.com/bmw/techarticles/tech_main.htm";

/// Two-level crawl of the tech-article index: the master page links one
/// sub-index per chassis, each sub-index lists the DIY articles. A failed
/// sub-index is skipped; partial results from the others are kept.
pub async fn crawl<F: PageFetcher>(fetcher: &F) -> CrawlIndex {
    let mut index = CrawlIndex::new();

    let master_html = match fetcher.fetch(MASTER_URL).await {
        FetchOutcome::Success(html) => html,
        FetchOutcome::Transient(reason) => {
            warn!("master index unreachable: {}", reason);
            return index;
        }
    };

    let sub_pages = find_sub_indexes(&master_html, MASTER_URL);
    info!("found {} chassis sub-indexes", sub_pages.len());

    let pb = ProgressBar::new(sub_pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap()
            .progress_chars("=> "),
    );

    for (sub_url, code) in &sub_pages {
        match fetcher.fetch(sub_url).await {
            FetchOutcome::Success(html) => index_sub_page(&html, sub_url, *code, &mut index),
            FetchOutcome::Transient(reason) => {
                warn!("skipping sub-index {}: {}", sub_url, reason);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("found {} diy articles", index.len());
    index
}

/// Level 1: anchors whose text (e.g. "BMW 3-Series 1992-1999") or href
/// resolves to a code, pointing at another tech_main page. The set dedups
/// repeated links to the same sub-index.
fn find_sub_indexes(html: &str, base: &str) -> BTreeSet<(String, &'static str)> {
    let mut subs = BTreeSet::new();
    for anchor in extract_anchors(html, base) {
        let code = chassis::resolve(&anchor.text).or_else(|| chassis::resolve(&anchor.href));
        if let Some(code) = code {
            if anchor.href.contains("tech_main") {
                subs.insert((anchor.href, code));
            }
        }
    }
    subs
}

/// Level 2: leaf articles inherit the sub-index code unless their own
/// anchor text resolves to a different chassis (sub-indexes do mix the odd
/// crossover article in).
fn index_sub_page(html: &str, sub_url: &str, parent_code: &'static str, index: &mut CrawlIndex) {
    for anchor in extract_anchors(html, sub_url) {
        if !is_leaf_article(&anchor.href) {
            continue;
        }
        let code = chassis::resolve(&anchor.text).unwrap_or(parent_code);
        index.insert(
            anchor.href.clone(),
            ArticleRecord {
                url: anchor.href,
                code,
                source: SourceType::PelicanDiy,
            },
        );
    }
}

fn is_leaf_article(href: &str) -> bool {
    href.contains("techarticles") && href.ends_with(".htm") && !href.contains("tech_main")
}

// ── Tests ──
