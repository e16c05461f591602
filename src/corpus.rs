use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::crawl::CrawlIndex;

/// Source vocabulary of the hand-off artifact. Closed set: downstream
/// filters match on the exact label strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    GeneralHistory,
    ExpertGuide,
    PelicanDiy,
    ServiceManual,
    ServiceManualOcr,
}

impl SourceType {
    pub fn label(self) -> &'static str {
        match self {
            SourceType::GeneralHistory => "General History",
            SourceType::ExpertGuide => "Expert Guide",
            SourceType::PelicanDiy => "Pelican DIY",
            SourceType::ServiceManual => "Service Manual",
            SourceType::ServiceManualOcr => "Service Manual (OCR)",
        }
    }
}

/// One unit of work for the fetch/ocr/embed collaborators. `label` is a
/// catalog code or a fallback ("General", raw model name) -- never an
/// arbitrary string. Local manuals carry `remote = false` and are left for
/// the external OCR service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub locator: String,
    pub label: String,
    pub source: SourceType,
    pub remote: bool,
}

/// Union the per-site indexes into the merged hand-off index. On url
/// collisions the earlier-supplied crawler wins; an assigned code is never
/// replaced, so nothing downgrades to a generic fallback.
pub fn merge(indexes: Vec<CrawlIndex>) -> CrawlIndex {
    let mut merged = CrawlIndex::new();
    for index in indexes {
        for (url, record) in index {
            merged.entry(url).or_insert(record);
        }
    }
    merged
}

/// Flatten the merged index into collaborator work items.
pub fn work_items(merged: &CrawlIndex) -> Vec<WorkItem> {
    merged
        .values()
        .map(|record| WorkItem {
            locator: record.url.clone(),
            label: record.code.to_string(),
            source: record.source,
            remote: true,
        })
        .collect()
}

/// One General History article per catalog model, labeled with the raw
/// model name (no chassis resolution -- the model list is the label space
/// for background material).
pub fn wiki_items(catalog: &Catalog) -> Vec<WorkItem> {
    catalog
        .models()
        .iter()
        .map(|model| WorkItem {
            locator: format!("https://en.wikipedia.org/wiki/{}", model),
            label: model.clone(),
            source: SourceType::GeneralHistory,
            remote: true,
        })
        .collect()
}

/// Guide slugs already claimed this run. Aliased codes share a slug
/// (E36-7 and E36-8 are both z3), so the same remote guide page is never
/// fetched twice under two internal codes.
#[derive(Debug, Default)]
pub struct GuideClaims(HashSet<String>);

impl GuideClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slug; false if another alias already owns it.
    pub fn claim(&mut self, slug: &str) -> bool {
        self.0.insert(slug.to_string())
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::ArticleRecord;

    fn record(url: &str, code: &'static str, source: SourceType) -> ArticleRecord {
        ArticleRecord {
            url: url.to_string(),
            code,
            source,
        }
    }

    fn index_of(records: Vec<ArticleRecord>) -> CrawlIndex {
        records.into_iter().map(|r| (r.url.clone(), r)).collect()
    }

    #[test]
    fn first_crawler_wins_on_shared_urls() {
        let a = index_of(vec![
            record("https://x/guide", "E30", SourceType::ExpertGuide),
            record("https://x/only-a", "E36", SourceType::ExpertGuide),
        ]);
        let b = index_of(vec![
            record("https://x/guide", "E46", SourceType::PelicanDiy),
            record("https://x/only-b", "E39", SourceType::PelicanDiy),
        ]);

        let merged = merge(vec![a, b]);
        assert_eq!(merged["https://x/guide"].code, "E30");
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn merged_size_never_exceeds_unique_urls() {
        let a = index_of(vec![record("https://x/1", "E30", SourceType::ExpertGuide)]);
        let b = index_of(vec![
            record("https://x/1", "E36", SourceType::PelicanDiy),
            record("https://x/2", "E36", SourceType::PelicanDiy),
        ]);
        assert_eq!(merge(vec![a, b]).len(), 2);
    }

    #[test]
    fn work_items_carry_code_labels_and_sources() {
        let merged = index_of(vec![record("https://x/1", "E28", SourceType::PelicanDiy)]);
        let items = work_items(&merged);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "E28");
        assert_eq!(items[0].source.label(), "Pelican DIY");
        assert!(items[0].remote);
    }

    #[test]
    fn wiki_items_use_the_raw_model_name() {
        let catalog = Catalog::from_models(vec!["1994_bmw_318i".to_string()]);
        let items = wiki_items(&catalog);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].locator, "https://en.wikipedia.org/wiki/1994_bmw_318i");
        assert_eq!(items[0].label, "1994_bmw_318i");
        assert_eq!(items[0].source.label(), "General History");
    }

    #[test]
    fn claims_collapse_aliases_to_one_slug() {
        let mut claims = GuideClaims::new();
        assert!(claims.claim("z3"));
        // the E36-8 alias arrives later and must not re-claim
        assert!(!claims.claim("z3"));
        assert!(claims.claim("e30"));
    }

    #[test]
    fn source_labels_are_the_fixed_enumeration() {
        assert_eq!(SourceType::GeneralHistory.label(), "General History");
        assert_eq!(SourceType::ExpertGuide.label(), "Expert Guide");
        assert_eq!(SourceType::PelicanDiy.label(), "Pelican DIY");
        assert_eq!(SourceType::ServiceManual.label(), "Service Manual");
        assert_eq!(SourceType::ServiceManualOcr.label(), "Service Manual (OCR)");
    }
}
