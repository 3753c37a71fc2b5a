use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

/// Idempotent: a no-op when the table already exists.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS wine_reviews (
            sha512_hash          TEXT PRIMARY KEY,
            link                 TEXT NOT NULL,
            title                TEXT NOT NULL,
            page_number          INTEGER NOT NULL,
            vintage              INTEGER,
            rating               INTEGER,
            price                REAL,
            price_per_milliliter REAL,
            designation          TEXT,
            variety              TEXT,
            appellation          TEXT,
            winery               TEXT,
            alcohol              REAL,
            bottle_size          REAL,
            category             TEXT,
            date_published       TEXT,
            author_name          TEXT,
            review_body          TEXT
        );
        ",
    )?;
    Ok(())
}

/// One normalized review, keyed by the SHA-512 of the fetched page body.
#[derive(Debug, Clone)]
pub struct ReviewRow {
    pub sha512_hash: String,
    pub link: String,
    pub title: String,
    pub page_number: i64,
    pub vintage: Option<i32>,
    pub rating: Option<i32>,
    pub price: Option<f64>,
    pub price_per_milliliter: Option<f64>,
    pub designation: Option<String>,
    pub variety: Option<String>,
    pub appellation: Option<String>,
    pub winery: Option<String>,
    pub alcohol: Option<f64>,
    pub bottle_size: Option<f64>,
    pub category: Option<String>,
    pub date_published: Option<String>,
    pub author_name: Option<String>,
    pub review_body: Option<String>,
}

/// Append a batch of reviews. Rows whose hash is already present are ignored,
/// so re-crawling an already-persisted page range adds nothing. Returns the
/// number of rows actually inserted.
pub fn insert_reviews(conn: &Connection, rows: &[ReviewRow]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO wine_reviews
             (sha512_hash, link, title, page_number, vintage, rating, price,
              price_per_milliliter, designation, variety, appellation, winery,
              alcohol, bottle_size, category, date_published, author_name, review_body)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)",
        )?;
        for r in rows {
            count += stmt.execute(rusqlite::params![
                r.sha512_hash,
                r.link,
                r.title,
                r.page_number,
                r.vintage,
                r.rating,
                r.price,
                r.price_per_milliliter,
                r.designation,
                r.variety,
                r.appellation,
                r.winery,
                r.alcohol,
                r.bottle_size,
                r.category,
                r.date_published,
                r.author_name,
                r.review_body,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn count_reviews(conn: &Connection) -> Result<usize> {
    let n = conn.query_row("SELECT COUNT(*) FROM wine_reviews", [], |r| r.get(0))?;
    Ok(n)
}

pub fn count_distinct_hashes(conn: &Connection) -> Result<usize> {
    let n = conn.query_row(
        "SELECT COUNT(DISTINCT sha512_hash) FROM wine_reviews",
        [],
        |r| r.get(0),
    )?;
    Ok(n)
}
