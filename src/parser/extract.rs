use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

static PRIMARY_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.primary-info li.row").unwrap());
static SECONDARY_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.secondary-info li.row").unwrap());
static INFO_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.info-label span").unwrap());
static INFO_VALUE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.info span").unwrap());
static SECTION_META: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="article:section"][content="Wine Reviews"]"#).unwrap()
});
static PUBLISHED_META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="article:published_time"]"#).unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

/// Collapse an element's text to single-space-separated trimmed form.
fn clean_text(el: ElementRef) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn info_rows(doc: &Html, rows: &Selector) -> Vec<(String, String)> {
    doc.select(rows)
        .filter_map(|row| {
            let label = row.select(&INFO_LABEL).next()?;
            let value = row.select(&INFO_VALUE).next()?;
            Some((clean_text(label), clean_text(value)))
        })
        .collect()
}

/// Label/value pairs from the primary-info list, in document order.
pub fn primary_info(doc: &Html) -> Vec<(String, String)> {
    info_rows(doc, &PRIMARY_ROWS)
}

/// Label/value pairs from the secondary-info list, in document order.
pub fn secondary_info(doc: &Html) -> Vec<(String, String)> {
    info_rows(doc, &SECONDARY_ROWS)
}

/// The embedded structured-data block: one JSON object in the first script
/// element following the article-section meta tag, flattened with dotted keys
/// for nested objects (e.g. `review.author.name`).
pub fn structured_data(doc: &Html) -> Option<Vec<(String, String)>> {
    let anchor = doc.select(&SECTION_META).next()?;
    let script = anchor
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "script")?;
    let json: Value = serde_json::from_str(&script.text().collect::<String>()).ok()?;

    let mut pairs = Vec::new();
    flatten(&json, "", &mut pairs);
    Some(pairs)
}

fn flatten(value: &Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten(v, &key, out);
            }
        }
        Value::Null => {}
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

/// The machine-readable publish timestamp from the page meta tag.
pub fn date_published(doc: &Html) -> Option<String> {
    doc.select(&PUBLISHED_META)
        .next()?
        .value()
        .attr("content")
        .map(str::to_string)
}

/// All 4-digit substrings of a card title, leftmost first.
pub fn years_in_title(title: &str) -> Vec<i32> {
    YEAR_RE
        .find_iter(title)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}
