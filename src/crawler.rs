use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::{db, fetch, listing, parser};

pub const WINEMAG_BASE_URL: &str = "https://www.winemag.com";

pub struct CrawlConfig {
    pub base_url: String,
    /// Crawl delay in seconds, honored before every outbound request.
    pub wait_time: u64,
}

impl CrawlConfig {
    pub fn listing_url(&self, page: u32) -> String {
        format!(
            "{}/?s=&drink_type=wine&page={}&sort_by=pub_date_web&sort_dir=desc&search_type=reviews",
            self.base_url, page
        )
    }
}

/// Crawl summary returned after completion.
pub struct CrawlStats {
    pub pages: usize,
    pub reviews: usize,
    pub flagged: usize,
}

/// Crawl listing pages `start..=end` in order, fetching and normalizing every
/// review each page links to. Each page's batch is persisted before the next
/// page starts, so partial progress survives a crash between pages. An empty
/// listing page is skipped, not an error; a failed fetch halts the crawl.
pub async fn crawl_pages(
    conn: &Connection,
    client: &Client,
    cfg: &CrawlConfig,
    start: u32,
    end: u32,
) -> Result<CrawlStats> {
    let mut stats = CrawlStats {
        pages: 0,
        reviews: 0,
        flagged: 0,
    };

    for page in start..=end {
        println!("Scraping page number {}", page);
        wait(cfg).await;
        let body = fetch::fetch_page(client, &cfg.listing_url(page)).await?;
        let cards = listing::parse_listing(&body, page);
        stats.pages += 1;

        if cards.is_empty() {
            info!("No review items on page {}", page);
            continue;
        }

        let pb = ProgressBar::new(cards.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                .progress_chars("=> "),
        );

        let mut batch = Vec::with_capacity(cards.len());
        for card in &cards {
            wait(cfg).await;
            let body = fetch::fetch_page(client, &card.link).await?;
            let (row, flags) = parser::normalize_review(card, &body);
            for flag in &flags {
                debug!("{}: {}", card.link, flag);
            }
            stats.flagged += flags.len();
            batch.push(row);
            pb.inc(1);
        }
        pb.finish_and_clear();

        stats.reviews += db::insert_reviews(conn, &batch)?;
    }

    Ok(stats)
}

async fn wait(cfg: &CrawlConfig) {
    if cfg.wait_time > 0 {
        tokio::time::sleep(Duration::from_secs(cfg.wait_time)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_cfg(base_url: &str) -> CrawlConfig {
        CrawlConfig {
            base_url: base_url.to_string(),
            wait_time: 0,
        }
    }

    fn mem_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    fn listing_html(items: &[(&str, &str)]) -> String {
        let cards: String = items
            .iter()
            .map(|(title, link)| {
                format!(
                    r#"<li class="review-item">
                         <a class="review-listing" href="{link}">review</a>
                         <h3 class="title">{title}</h3>
                         <span class="appellation">Somewhere</span>
                         <span class="rating">90</span>
                         <span class="price">$20,</span>
                       </li>"#
                )
            })
            .collect();
        format!("<html><body><ul class=\"results\">{cards}</ul></body></html>")
    }

    fn review_html(designation: &str) -> String {
        format!(
            r#"<html><head>
                 <meta property="article:published_time" content="2021-05-04T15:28:31+00:00">
               </head><body>
                 <ul class="primary-info">
                   <li class="row">
                     <div class="info-label"><span>Designation</span></div>
                     <div class="info"><span>{designation}</span></div>
                   </li>
                   <li class="row">
                     <div class="info-label"><span>Price</span></div>
                     <div class="info"><span>$20,</span></div>
                   </li>
                 </ul>
                 <ul class="secondary-info">
                   <li class="row">
                     <div class="info-label"><span>Bottle Size</span></div>
                     <div class="info"><span>750 ml</span></div>
                   </li>
                 </ul>
               </body></html>"#
        )
    }

    async fn mock_listing(
        server: &mut mockito::Server,
        page: u32,
        body: String,
        hits: usize,
    ) -> mockito::Mock {
        server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("page".into(), page.to_string()))
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn one_listing_fetch_per_page_in_range() {
        let mut server = mockito::Server::new_async().await;
        let m2 = mock_listing(&mut server, 2, listing_html(&[]), 1).await;
        let m3 = mock_listing(&mut server, 3, listing_html(&[]), 1).await;
        let m4 = mock_listing(&mut server, 4, listing_html(&[]), 1).await;

        let conn = mem_conn();
        let client = fetch::client().unwrap();
        let stats = crawl_pages(&conn, &client, &test_cfg(&server.url()), 2, 4)
            .await
            .unwrap();

        assert_eq!(stats.pages, 3);
        m2.assert_async().await;
        m3.assert_async().await;
        m4.assert_async().await;
    }

    #[tokio::test]
    async fn empty_listing_page_fetches_no_reviews() {
        let mut server = mockito::Server::new_async().await;
        let listing = mock_listing(&mut server, 1, listing_html(&[]), 1).await;
        let review = server
            .mock("GET", Matcher::Regex("^/review".into()))
            .expect(0)
            .create_async()
            .await;

        let conn = mem_conn();
        let client = fetch::client().unwrap();
        let stats = crawl_pages(&conn, &client, &test_cfg(&server.url()), 1, 1)
            .await
            .unwrap();

        assert_eq!(stats.reviews, 0);
        assert_eq!(db::count_reviews(&conn).unwrap(), 0);
        listing.assert_async().await;
        review.assert_async().await;
    }

    #[tokio::test]
    async fn page_batch_is_persisted_and_dedup_survives_recrawl() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let listing = mock_listing(
            &mut server,
            1,
            listing_html(&[
                ("Acme Winery 1998 Reserve", &format!("{base}/review/1")),
                ("Chateau Brume NV Brut", &format!("{base}/review/2")),
            ]),
            2,
        )
        .await;
        // Two crawls hit each review page twice
        let r1 = server
            .mock("GET", "/review/1")
            .with_body(review_html("Reserve"))
            .expect(2)
            .create_async()
            .await;
        let r2 = server
            .mock("GET", "/review/2")
            .with_body(review_html("Brut"))
            .expect(2)
            .create_async()
            .await;

        let conn = mem_conn();
        let client = fetch::client().unwrap();
        let cfg = test_cfg(&base);

        let first = crawl_pages(&conn, &client, &cfg, 1, 1).await.unwrap();
        assert_eq!(first.reviews, 2);
        // one NoYearInTitle flag from the NV bottling
        assert_eq!(first.flagged, 1);
        assert_eq!(db::count_distinct_hashes(&conn).unwrap(), 2);

        // identical page content hashes identically, so nothing new lands
        let second = crawl_pages(&conn, &client, &cfg, 1, 1).await.unwrap();
        assert_eq!(second.reviews, 0);
        assert_eq!(db::count_distinct_hashes(&conn).unwrap(), 2);

        listing.assert_async().await;
        r1.assert_async().await;
        r2.assert_async().await;
    }

    #[tokio::test]
    async fn failed_fetch_halts_the_crawl() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(500)
            .create_async()
            .await;

        let conn = mem_conn();
        let client = fetch::client().unwrap();
        let result = crawl_pages(&conn, &client, &test_cfg(&server.url()), 1, 2).await;
        assert!(result.is_err());
    }
}
