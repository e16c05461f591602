use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::catalog::Catalog;
use crate::chassis::{self, explicit};
use crate::corpus::{SourceType, WorkItem};

pub const DATA_DIR: &str = "bmw_rag_data";

/// Scan each model's manual folder for PDFs and queue them as local work
/// items. `ocr` routes them to the external OCR collaborator instead of
/// plain text extraction.
pub fn discover(catalog: &Catalog, data_dir: &Path, ocr: bool) -> Result<Vec<WorkItem>> {
    let source = if ocr {
        SourceType::ServiceManualOcr
    } else {
        SourceType::ServiceManual
    };

    let mut items = Vec::new();
    for model in catalog.models() {
        let folder = data_dir.join(model);
        if !folder.is_dir() {
            continue;
        }

        let mut pdfs: Vec<_> = fs::read_dir(&folder)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        if pdfs.is_empty() {
            continue;
        }
        pdfs.sort();

        let label = folder_label(model, &pdfs[0]);
        info!("queueing {} manuals for {}", pdfs.len(), label);

        for pdf in &pdfs {
            items.push(WorkItem {
                locator: pdf.display().to_string(),
                label: label.clone(),
                source,
                remote: false,
            });
        }
    }
    Ok(items)
}

/// Label precedence: an explicit code in the folder name, else whatever the
/// first filename resolves to (vague folders like "manuals_misc" usually
/// hold classifiable files), else the raw model name.
fn folder_label(model: &str, first_pdf: &Path) -> String {
    if let Some(code) = explicit::find(model) {
        return code.to_string();
    }
    let filename = first_pdf
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    match chassis::resolve(&filename) {
        Some(code) => code.to_string(),
        None => model.to_string(),
    }
}

// ── Tests ──
