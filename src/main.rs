mod crawler;
mod db;
mod fetch;
mod listing;
mod parser;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::bail;
use clap::Parser;

use crawler::{CrawlConfig, WINEMAG_BASE_URL};

/// Crawl wine-review listing pages and persist normalized reviews to sqlite.
#[derive(Parser)]
#[command(name = "wine_scraper", about = "Wine review scraper for winemag.com")]
struct Cli {
    /// First listing page to crawl (> 0)
    #[arg(long)]
    pages_start: u32,

    /// Last listing page to crawl (>= --pages-start)
    #[arg(long)]
    pages_end: u32,

    /// Path to the sqlite database (default: wine-reviews.db next to the executable)
    #[arg(long)]
    sqlite_path: Option<PathBuf>,

    /// Seconds to wait before each request
    #[arg(long, default_value_t = 1)]
    wait_time: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if cli.pages_start < 1 {
        bail!("Page Range ERROR: --pages-start has to be greater than 0!");
    }
    if cli.pages_end < cli.pages_start {
        bail!("Page Range ERROR: --pages-end has to be greater than or equal to --pages-start!");
    }

    let sqlite_path = cli.sqlite_path.unwrap_or_else(default_sqlite_path);
    let conn = db::connect(&sqlite_path)?;
    db::init_schema(&conn)?;
    let client = fetch::client()?;
    let cfg = CrawlConfig {
        base_url: WINEMAG_BASE_URL.to_string(),
        wait_time: cli.wait_time,
    };

    let t0 = Instant::now();
    let stats = crawler::crawl_pages(&conn, &client, &cfg, cli.pages_start, cli.pages_end).await?;

    println!(
        "Done: {} pages, {} new reviews ({} flags).",
        stats.pages, stats.reviews, stats.flagged
    );
    println!(
        "{} rows ({} distinct hashes) in {}",
        db::count_reviews(&conn)?,
        db::count_distinct_hashes(&conn)?,
        sqlite_path.display()
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("Finished in {}", format_duration(elapsed));
    }

    Ok(())
}

fn default_sqlite_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("wine-reviews.db")))
        .unwrap_or_else(|| PathBuf::from("wine-reviews.db"))
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
