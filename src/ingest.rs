use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use spider_client::shapes::request::{ReturnFormat, ReturnFormatHandling};
use spider_client::{RequestParams, Spider};
use tracing::info;

use crate::db::{DocumentRow, PendingItem};

// Fixed-size batches with a pause between them: a rate-limit courtesy to
// the collaborator, not a correctness concern. Every queued locator is
// handed over exactly once either way.
const BATCH_SIZE: usize = 10;
const BATCH_PAUSE_MS: u64 = 500;

pub struct IngestStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Hand pending work items to the content-fetch collaborator, strictly
/// sequentially, saving each document row as it arrives and marking its
/// item fetched. Failures are recorded and never retried -- a dead url
/// stays absent for the run.
pub async fn ingest_pending(conn: &Connection, items: Vec<PendingItem>) -> Result<IngestStats> {
    let api_key = std::env::var("SPIDER_API_KEY")
        .map_err(|_| anyhow::anyhow!("SPIDER_API_KEY environment variable must be set"))?;
    let spider = Spider::new(Some(api_key))
        .map_err(|e| anyhow::anyhow!("Failed to create Spider client: {}", e))?;

    let total = items.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Prepare statements once, reuse for each row
    let mut insert_stmt = conn.prepare(
        "INSERT INTO documents (item_id, locator, label, source, content, status, error, latency_ms)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    let mut update_stmt = conn.prepare(
        "UPDATE work_items SET fetched = 1, fetched_at = datetime('now') WHERE id = ?1",
    )?;

    let mut ok = 0usize;
    let mut errors = 0usize;

    for (i, batch) in items.chunks(BATCH_SIZE).enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(BATCH_PAUSE_MS)).await;
        }
        for item in batch {
            let row = fetch_one(&spider, item).await;
            if row.error.is_some() {
                errors += 1;
            } else {
                ok += 1;
            }
            save_one(&mut insert_stmt, &mut update_stmt, &row)?;
            pb.inc(1);
        }
    }

    pb.finish_and_clear();
    info!("Fetched {} documents ({} ok, {} errors)", total, ok, errors);

    Ok(IngestStats { total, ok, errors })
}

/// Save a single fetched document using pre-prepared statements.
fn save_one(
    insert: &mut rusqlite::Statement,
    update: &mut rusqlite::Statement,
    row: &DocumentRow,
) -> Result<()> {
    insert.execute(rusqlite::params![
        row.item_id,
        row.locator,
        row.label,
        row.source,
        row.content,
        row.status,
        row.error,
        row.latency_ms,
    ])?;
    update.execute(rusqlite::params![row.item_id])?;
    Ok(())
}

async fn fetch_one(spider: &Spider, item: &PendingItem) -> DocumentRow {
    let params = RequestParams {
        return_format: Some(ReturnFormatHandling::Single(ReturnFormat::Markdown)),
        ..Default::default()
    };

    let start = Instant::now();
    let response = spider
        .scrape_url(&item.locator, Some(params), "application/json")
        .await;
    let elapsed = start.elapsed().as_millis() as i64;

    match response {
        Ok(value) => {
            let parsed: serde_json::Value = match value.as_str() {
                Some(s) => serde_json::from_str(s).unwrap_or(value.clone()),
                None => value,
            };

            let first = parsed.as_array().and_then(|arr| arr.first());

            let content = first
                .and_then(|obj| obj.get("content"))
                .and_then(|c| c.as_str())
                .map(flatten_newlines);

            let status = first
                .and_then(|obj| obj.get("status"))
                .and_then(|s| s.as_i64())
                .map(|s| s as i32);

            let error = if content.is_none() {
                Some("no content in response".to_string())
            } else {
                None
            };

            DocumentRow {
                item_id: item.id,
                locator: item.locator.clone(),
                label: item.label.clone(),
                source: item.source.clone(),
                content,
                status,
                error,
                latency_ms: Some(elapsed),
            }
        }
        Err(e) => DocumentRow {
            item_id: item.id,
            locator: item.locator.clone(),
            label: item.label.clone(),
            source: item.source.clone(),
            content: None,
            status: None,
            error: Some(e.to_string()),
            latency_ms: Some(elapsed),
        },
    }
}

/// Downstream chunkers expect single-line text.
fn flatten_newlines(text: &str) -> String {
    text.replace('\n', " ")
}

// ── Tests ──
