use tracing::{debug, info};

use super::{ArticleRecord, CrawlIndex, PageFetcher};
use crate::catalog::Catalog;
use crate::chassis::{codes, explicit};
use crate::corpus::{GuideClaims, SourceType};

/// Candidate guide urls for one slug. The blog has used a few title shapes
/// over the years; probing all of them finds whichever exist.
fn candidate_urls(slug: &str, code: &str) -> Vec<String> {
    vec![
        format!("https://blog.fcpeuro.com/bmw-{}-buyers-guide", slug),
        format!("https://blog.fcpeuro.com/the-definitive-guide-to-the-bmw-{}", slug),
        format!("https://blog.fcpeuro.com/most-common-bmw-{}-problems", slug),
        // sometimes formatted like "bmw-x5-e53"
        format!(
            "https://blog.fcpeuro.com/bmw-{}-{}-buyers-guide",
            slug,
            code.to_lowercase()
        ),
    ]
}

/// HEAD-probe the per-chassis buyer's guides for every focus model in the
/// catalog. The claim set collapses code aliases that share one published
/// guide (E36-7 and E36-8 both land on the z3 pages) to a single probe, so
/// the same remote page is never queued twice. Dead urls are simply absent.
pub async fn probe<F: PageFetcher>(
    fetcher: &F,
    catalog: &Catalog,
    claims: &mut GuideClaims,
) -> CrawlIndex {
    let mut index = CrawlIndex::new();

    for model in catalog.models() {
        let code = match explicit::find(model) {
            Some(code) => code,
            None => continue,
        };
        let slug = codes::guide_slug(code);
        if !claims.claim(&slug) {
            debug!("slug {} already claimed, skipping {}", slug, code);
            continue;
        }

        for url in candidate_urls(&slug, code) {
            if fetcher.probe(&url).await {
                index.insert(
                    url.clone(),
                    ArticleRecord {
                        url,
                        code,
                        source: SourceType::ExpertGuide,
                    },
                );
            }
        }
    }

    info!("found {} chassis guides", index.len());
    index
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::testing::FakeFetcher;

    #[tokio::test]
    async fn aliased_codes_probe_their_shared_guide_once() {
        let catalog = Catalog::from_models(vec![
            "1997_bmw_Z3_E36-7_roadster".to_string(),
            "1999_bmw_Z3_E36-8_coupe".to_string(),
        ]);
        let fetcher = FakeFetcher {
            live: vec!["https://blog.fcpeuro.com/bmw-z3-buyers-guide".to_string()],
            ..Default::default()
        };

        let mut claims = GuideClaims::new();
        let index = probe(&fetcher, &catalog, &mut claims).await;

        // one guide, claimed by the first alias encountered
        assert_eq!(index.len(), 1);
        let record = &index["https://blog.fcpeuro.com/bmw-z3-buyers-guide"];
        assert_eq!(record.code, "E36-7");
    }

    #[tokio::test]
    async fn non_focus_models_are_skipped() {
        let catalog = Catalog::from_models(vec!["1975_bmw_2002tii".to_string()]);
        let fetcher = FakeFetcher {
            live: vec!["https://blog.fcpeuro.com/bmw-2002-buyers-guide".to_string()],
            ..Default::default()
        };

        let mut claims = GuideClaims::new();
        assert!(probe(&fetcher, &catalog, &mut claims).await.is_empty());
    }

    #[tokio::test]
    async fn every_live_candidate_shape_is_recorded() {
        let catalog = Catalog::from_models(vec!["2003_bmw_X5_E53".to_string()]);
        let fetcher = FakeFetcher {
            live: vec![
                "https://blog.fcpeuro.com/bmw-x5-buyers-guide".to_string(),
                "https://blog.fcpeuro.com/bmw-x5-e53-buyers-guide".to_string(),
            ],
            ..Default::default()
        };

        let mut claims = GuideClaims::new();
        let index = probe(&fetcher, &catalog, &mut claims).await;
        assert_eq!(index.len(), 2);
        assert!(index.values().all(|r| r.code == "E53"));
    }
}
