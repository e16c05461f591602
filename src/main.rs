mod catalog;
mod chassis;
mod corpus;
mod crawl;
mod db;
mod ingest;
mod manuals;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use catalog::Catalog;
use crawl::HttpFetcher;

#[derive(Parser)]
#[command(name = "bmw_corpus", about = "BMW chassis knowledge corpus builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl web sources and enqueue classified work items
    Crawl {
        /// Listing pages to walk on the flat blog index
        #[arg(long, default_value_t = crawl::fcp::DEFAULT_PAGES)]
        pages: u32,
    },
    /// Discover local service manuals and enqueue them
    Manuals {
        /// Route manuals to the external OCR collaborator
        #[arg(long)]
        ocr: bool,
        /// Root folder holding one subfolder per model
        #[arg(long, default_value = manuals::DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Fetch queued remote items via the content collaborator
    Ingest {
        /// Max items to fetch (default: all pending)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Crawl + ingest in one pipeline
    Run {
        #[arg(long, default_value_t = crawl::fcp::DEFAULT_PAGES)]
        pages: u32,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Classify a single text (url, title, filename)
    Classify { text: String },
    /// Show queue statistics
    Stats,
    /// Per-chassis document counts
    Overview {
        /// Filter by label (e.g. "E30")
        #[arg(short, long)]
        label: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Crawl { pages } => {
            let catalog = Catalog::load(catalog::CATALOG_PATH)?;
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let queued = run_crawl(&conn, &catalog, pages).await?;
            println!("Queued {} new work items", queued);
            Ok(())
        }
        Commands::Manuals { ocr, data_dir } => {
            let catalog = Catalog::load(catalog::CATALOG_PATH)?;
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let items = manuals::discover(&catalog, &data_dir, ocr)?;
            if items.is_empty() {
                println!("No manuals found under {}", data_dir.display());
                return Ok(());
            }
            let queued = db::insert_work_items(&conn, &items)?;
            println!(
                "Queued {} manuals ({} already known)",
                queued,
                items.len() - queued
            );
            Ok(())
        }
        Commands::Ingest { limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            run_ingest(&conn, limit).await
        }
        Commands::Run { pages, limit } => {
            let catalog = Catalog::load(catalog::CATALOG_PATH)?;
            let conn = db::connect()?;
            db::init_schema(&conn)?;

            let t_crawl = Instant::now();
            let queued = run_crawl(&conn, &catalog, pages).await?;
            println!(
                "Queued {} new work items in {:.1}s",
                queued,
                t_crawl.elapsed().as_secs_f64()
            );

            run_ingest(&conn, limit).await
        }
        Commands::Classify { text } => {
            match chassis::resolve(&text) {
                Some(code) => println!("{}", code),
                None => println!("no match"),
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Queued:        {}", s.queued);
            println!("Fetched:       {}", s.fetched);
            println!("Pending (web): {}", s.pending_remote);
            println!("Pending (OCR): {}", s.pending_local);
            println!("Documents:     {}", s.documents);
            println!("Errors:        {}", s.errors);
            Ok(())
        }
        Commands::Overview { label, limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, label.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No work items yet. Run 'crawl' first.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<28} | {:>6} | {:>7} | {:>9}",
                "#", "Label", "Items", "Fetched", "Documents"
            );
            println!("{}", "-".repeat(66));
            for (i, r) in rows.iter().enumerate() {
                println!(
                    "{:>3} | {:<28} | {:>6} | {:>7} | {:>9}",
                    i + 1,
                    truncate(&r.label, 28),
                    r.items,
                    r.fetched,
                    r.documents
                );
            }
            println!("\n{} labels", rows.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// All web sources in precedence order: explicitly coded guide probes
/// first, then the blog listing, then the tech-article tree. The merge is
/// first-seen-wins, so this ordering is what "earlier-crawled source wins"
/// means.
async fn run_crawl(conn: &Connection, catalog: &Catalog, pages: u32) -> Result<usize> {
    let mut queued = 0;

    let wiki = corpus::wiki_items(catalog);
    println!("Queueing {} general-history articles...", wiki.len());
    queued += db::insert_work_items(conn, &wiki)?;

    let fetcher = HttpFetcher::new(Duration::from_secs(5))?;

    println!("Probing chassis buyer's guides...");
    let mut claims = corpus::GuideClaims::new();
    let guides = crawl::guides::probe(&fetcher, catalog, &mut claims).await;

    println!("Crawling blog listing (pages 1-{})...", pages);
    let fcp = crawl::fcp::crawl(&fetcher, pages).await;

    println!("Crawling tech-article master list...");
    let slow_fetcher = HttpFetcher::new(Duration::from_secs(10))?;
    let pelican = crawl::pelican::crawl(&slow_fetcher).await;

    let merged = corpus::merge(vec![guides, fcp, pelican]);
    println!("Merged index: {} unique articles", merged.len());

    let items = corpus::work_items(&merged);
    queued += db::insert_work_items(conn, &items)?;
    Ok(queued)
}

async fn run_ingest(conn: &Connection, limit: Option<usize>) -> Result<()> {
    let pending = db::fetch_pending(conn, limit)?;
    if pending.is_empty() {
        let stats = db::get_stats(conn)?;
        if stats.documents == 0 {
            println!("No documents produced; check the catalog or your connection. Downstream indexing skipped.");
        } else {
            println!("No pending remote items. Run 'crawl' first or all items are fetched.");
        }
        return Ok(());
    }

    println!(
        "Fetching {} documents (batches of 10, streaming to DB)...",
        pending.len()
    );
    let stats = ingest::ingest_pending(conn, pending).await?;
    println!(
        "Done: {} fetched ({} ok, {} errors).",
        stats.total, stats.ok, stats.errors
    );
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
