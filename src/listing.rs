use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

static REVIEW_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.review-item").unwrap());
static REVIEW_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.review-listing").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3.title").unwrap());
static APPELLATION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.appellation").unwrap());
static RATING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.rating").unwrap());
static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.price").unwrap());

/// Lightweight reference to one review, as found on a listing page. Rating and
/// price stay raw strings here; typing happens during review-page
/// normalization.
#[derive(Debug, Clone)]
pub struct Card {
    pub title: String,
    pub appellation: String,
    pub rating: String,
    pub price: String,
    pub link: String,
    pub page_number: u32,
}

/// Parse a search-results page into cards, in document order. A page with no
/// review items yields an empty Vec; that is the normal end-of-results
/// condition, not an error.
pub fn parse_listing(html: &str, page_number: u32) -> Vec<Card> {
    let doc = Html::parse_document(html);

    doc.select(&REVIEW_ITEM)
        .filter_map(|item| {
            let link = match item
                .select(&REVIEW_LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
            {
                Some(href) => href.to_string(),
                None => {
                    warn!("Review item without a listing link on page {}, skipping", page_number);
                    return None;
                }
            };
            Some(Card {
                title: text_of(item, &TITLE),
                appellation: text_of(item, &APPELLATION),
                rating: text_of(item, &RATING),
                price: text_of(item, &PRICE),
                link,
                page_number,
            })
        })
        .collect()
}

fn text_of(item: ElementRef, sel: &Selector) -> String {
    item.select(sel)
        .next()
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}
