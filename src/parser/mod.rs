pub mod extract;
pub mod fields;
pub mod scraped;

use std::fmt;

use scraper::Html;
use sha2::{Digest, Sha512};

use crate::db::ReviewRow;
use crate::listing::Card;
use fields::keys;
use scraped::ScrapedInfo;

/// Data-quality anomaly noticed while normalizing one review page. Flags are
/// logged for diagnostics and counted in the crawl summary; they are never
/// persisted with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    MultipleYearsInTitle,
    NoYearInTitle,
    NoDesignation,
    DuplicateKeyOnMerge,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Flag::MultipleYearsInTitle => {
                "multiple year-like values in title, taking the first as vintage"
            }
            Flag::NoYearInTitle => "no vintage year found in title",
            Flag::NoDesignation => "no designation in primary info",
            Flag::DuplicateKeyOnMerge => "duplicate key overwritten while merging page data",
        };
        f.write_str(msg)
    }
}

/// Normalize one fetched review page into a typed row plus the anomalies seen
/// along the way.
///
/// Merge order matters: card seed, then primary info, then secondary info,
/// then the structured-data block, so later sources win on key collisions.
/// The published-time meta is applied last and always overwrites.
pub fn normalize_review(card: &Card, body: &str) -> (ReviewRow, Vec<Flag>) {
    let doc = Html::parse_document(body);
    let mut flags = Vec::new();
    let mut info = ScrapedInfo::new();

    info.insert(keys::LINK, card.link.as_str());
    info.insert(keys::PAGE_NUMBER, card.page_number.to_string());
    info.insert(keys::TITLE, card.title.as_str());

    for (label, value) in extract::primary_info(&doc) {
        info.insert(label, value);
    }
    for (label, value) in extract::secondary_info(&doc) {
        info.merge(label, value, &mut flags);
    }
    if let Some(pairs) = extract::structured_data(&doc) {
        for (key, value) in pairs {
            info.merge(key, value, &mut flags);
        }
    }
    if let Some(ts) = extract::date_published(&doc) {
        info.overwrite(keys::DATE_PUBLISHED, fields::normalize_date(&ts));
    }

    let vintage = vintage_from_title(&card.title, &mut flags);
    let sha512_hash = hex::encode(Sha512::digest(body.as_bytes()));

    let price = info.get(keys::PRICE).and_then(fields::parse_price);
    let bottle_size = info.get(keys::BOTTLE_SIZE).and_then(fields::parse_bottle_size_ml);
    let designation = match info.get(keys::DESIGNATION) {
        Some(v) => Some(v.to_string()),
        None => {
            flags.push(Flag::NoDesignation);
            None
        }
    };

    let row = ReviewRow {
        sha512_hash,
        link: card.link.clone(),
        title: card.title.clone(),
        page_number: i64::from(card.page_number),
        vintage,
        rating: info.get(keys::RATING).and_then(fields::parse_int),
        price,
        price_per_milliliter: fields::price_per_milliliter(price, bottle_size),
        designation,
        variety: owned(info.get(keys::VARIETY)),
        appellation: owned(info.get(keys::APPELLATION)),
        winery: owned(info.get(keys::WINERY)),
        alcohol: info.get(keys::ALCOHOL).and_then(fields::parse_alcohol),
        bottle_size,
        category: owned(info.get(keys::CATEGORY)),
        date_published: owned(info.get(keys::DATE_PUBLISHED)),
        author_name: owned(info.get(keys::AUTHOR_NAME)),
        review_body: owned(info.get(keys::REVIEW_BODY)),
    };

    (row, flags)
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

/// The first 4-digit number in the title is taken as the vintage. Zero or
/// multiple candidates are flagged.
fn vintage_from_title(title: &str, flags: &mut Vec<Flag>) -> Option<i32> {
    let years = extract::years_in_title(title);
    match years.len() {
        0 => {
            flags.push(Flag::NoYearInTitle);
            None
        }
        1 => Some(years[0]),
        _ => {
            flags.push(Flag::MultipleYearsInTitle);
            Some(years[0])
        }
    }
}
