use anyhow::Result;
use rusqlite::Connection;

use crate::corpus::WorkItem;

const DB_PATH: &str = "data/corpus.sqlite";

pub fn connect() -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(DB_PATH).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS work_items (
            id         INTEGER PRIMARY KEY,
            locator    TEXT UNIQUE NOT NULL,
            label      TEXT NOT NULL,
            source     TEXT NOT NULL,
            remote     BOOLEAN NOT NULL DEFAULT 1,
            fetched    BOOLEAN NOT NULL DEFAULT 0,
            fetched_at TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_work_items_fetched ON work_items(fetched);

        CREATE TABLE IF NOT EXISTS documents (
            id         INTEGER PRIMARY KEY,
            item_id    INTEGER NOT NULL REFERENCES work_items(id),
            locator    TEXT NOT NULL,
            label      TEXT NOT NULL,
            source     TEXT NOT NULL,
            content    TEXT,
            status     INTEGER,
            error      TEXT,
            latency_ms INTEGER,
            fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_documents_label ON documents(label);
        ",
    )?;
    Ok(())
}

// ── Work queue ──

/// Enqueue work items. `INSERT OR IGNORE` on the locator makes enqueuing
/// idempotent and preserves first-seen-wins at the persistence layer.
/// Returns how many were actually new.
pub fn insert_work_items(conn: &Connection, items: &[WorkItem]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO work_items (locator, label, source, remote)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for item in items {
            count += stmt.execute(rusqlite::params![
                item.locator,
                item.label,
                item.source.label(),
                item.remote,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub struct PendingItem {
    pub id: i64,
    pub locator: String,
    pub label: String,
    pub source: String,
}

/// Remote items awaiting the content-fetch collaborator. Local manuals are
/// excluded; those belong to the external OCR service.
pub fn fetch_pending(conn: &Connection, limit: Option<usize>) -> Result<Vec<PendingItem>> {
    let sql = format!(
        "SELECT id, locator, label, source FROM work_items
         WHERE fetched = 0 AND remote = 1 ORDER BY id{}",
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(PendingItem {
                id: row.get(0)?,
                locator: row.get(1)?,
                label: row.get(2)?,
                source: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// One fetched (or failed) document from the collaborator.
pub struct DocumentRow {
    pub item_id: i64,
    pub locator: String,
    pub label: String,
    pub source: String,
    pub content: Option<String>,
    pub status: Option<i32>,
    pub error: Option<String>,
    pub latency_ms: Option<i64>,
}

// ── Stats ──

pub struct Stats {
    pub queued: i64,
    pub fetched: i64,
    pub pending_remote: i64,
    pub pending_local: i64,
    pub documents: i64,
    pub errors: i64,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |sql: &str| -> Result<i64> {
        Ok(conn.query_row(sql, [], |row| row.get(0))?)
    };
    Ok(Stats {
        queued: count("SELECT COUNT(*) FROM work_items")?,
        fetched: count("SELECT COUNT(*) FROM work_items WHERE fetched = 1")?,
        pending_remote: count("SELECT COUNT(*) FROM work_items WHERE fetched = 0 AND remote = 1")?,
        pending_local: count("SELECT COUNT(*) FROM work_items WHERE fetched = 0 AND remote = 0")?,
        documents: count("SELECT COUNT(*) FROM documents WHERE content IS NOT NULL")?,
        errors: count("SELECT COUNT(*) FROM documents WHERE error IS NOT NULL")?,
    })
}

pub struct OverviewRow {
    pub label: String,
    pub items: i64,
    pub fetched: i64,
    pub documents: i64,
}

/// Per-label queue and document counts, biggest labels first.
pub fn fetch_overview(
    conn: &Connection,
    label: Option<&str>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let sql = format!(
        "SELECT w.label, COUNT(*) AS items, SUM(w.fetched) AS fetched,
                (SELECT COUNT(*) FROM documents d
                 WHERE d.label = w.label AND d.content IS NOT NULL) AS documents
         FROM work_items w
         {}
         GROUP BY w.label
         ORDER BY items DESC, w.label
         LIMIT {}",
        match label {
            Some(_) => "WHERE w.label = ?1",
            None => "",
        },
        limit
    );
    let mut stmt = conn.prepare(&sql)?;

    let map_row = |row: &rusqlite::Row| -> rusqlite::Result<OverviewRow> {
        Ok(OverviewRow {
            label: row.get(0)?,
            items: row.get(1)?,
            fetched: row.get(2)?,
            documents: row.get(3)?,
        })
    };
    let rows = match label {
        Some(l) => stmt.query_map([l], map_row)?.collect::<Result<Vec<_>, _>>()?,
        None => stmt.query_map([], map_row)?.collect::<Result<Vec<_>, _>>()?,
    };
    Ok(rows)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SourceType;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn item(locator: &str, label: &str, remote: bool) -> WorkItem {
        WorkItem {
            locator: locator.to_string(),
            label: label.to_string(),
            source: SourceType::ExpertGuide,
            remote,
        }
    }

    #[test]
    fn enqueue_is_idempotent_and_first_seen_wins() {
        let conn = test_conn();
        let first = insert_work_items(&conn, &[item("https://x/1", "E30", true)]).unwrap();
        assert_eq!(first, 1);

        // a later crawl re-discovers the url under a different label
        let second = insert_work_items(&conn, &[item("https://x/1", "E46", true)]).unwrap();
        assert_eq!(second, 0);

        let pending = fetch_pending(&conn, None).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].label, "E30");
    }

    #[test]
    fn pending_excludes_local_items() {
        let conn = test_conn();
        insert_work_items(
            &conn,
            &[
                item("https://x/1", "E30", true),
                item("manuals/e34/bentley.pdf", "E34", false),
            ],
        )
        .unwrap();

        let pending = fetch_pending(&conn, None).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].locator, "https://x/1");

        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.queued, 2);
        assert_eq!(stats.pending_remote, 1);
        assert_eq!(stats.pending_local, 1);
    }

    #[test]
    fn overview_groups_by_label() {
        let conn = test_conn();
        insert_work_items(
            &conn,
            &[
                item("https://x/1", "E30", true),
                item("https://x/2", "E30", true),
                item("https://x/3", "E36", true),
            ],
        )
        .unwrap();

        let rows = fetch_overview(&conn, None, 50).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "E30");
        assert_eq!(rows[0].items, 2);

        let filtered = fetch_overview(&conn, Some("E36"), 50).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].items, 1);
    }
}
