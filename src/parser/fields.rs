use chrono::DateTime;

/// Raw keys as they appear in the scraped page. The upstream site controls
/// this wording; keep every label in one place so a wording change upstream
/// touches exactly one table.
pub mod keys {
    pub const LINK: &str = "link";
    pub const TITLE: &str = "title";
    pub const PAGE_NUMBER: &str = "page_number";
    pub const RATING: &str = "rating";
    pub const PRICE: &str = "Price";
    pub const DESIGNATION: &str = "Designation";
    pub const VARIETY: &str = "Variety";
    pub const APPELLATION: &str = "Appellation";
    pub const WINERY: &str = "Winery";
    pub const ALCOHOL: &str = "Alcohol";
    pub const BOTTLE_SIZE: &str = "Bottle Size";
    pub const CATEGORY: &str = "Category";
    pub const DATE_PUBLISHED: &str = "date_published";
    pub const AUTHOR_NAME: &str = "review.author.name";
    pub const REVIEW_BODY: &str = "review.reviewBody";
}

/// Price text looks like "$45,Buy Now": everything after the `$` and before
/// the first comma is the number.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.split(',')
        .next()?
        .trim()
        .strip_prefix('$')?
        .trim()
        .parse()
        .ok()
}

/// Alcohol text ends with a percent sign: "14.5%".
pub fn parse_alcohol(raw: &str) -> Option<f64> {
    let t = raw.trim();
    t.strip_suffix('%').unwrap_or(t).trim().parse().ok()
}

/// Bottle size text is "<number> <unit>" with unit `ml` or `L`; liters are
/// normalized to milliliters. Any other unit is a parse failure.
pub fn parse_bottle_size_ml(raw: &str) -> Option<f64> {
    let mut parts = raw.trim().split_whitespace();
    let value: f64 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    match unit {
        "ml" => Some(value),
        "L" => Some(value * 1000.0),
        _ => None,
    }
}

pub fn parse_int(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

/// Null propagates from either operand.
pub fn price_per_milliliter(price: Option<f64>, bottle_size_ml: Option<f64>) -> Option<f64> {
    Some(price? / bottle_size_ml?)
}

/// Normalize the machine-readable publish timestamp to a plain ISO date.
/// Timestamps that don't parse as RFC 3339 are kept verbatim.
pub fn normalize_date(raw: &str) -> String {
    let t = raw.trim();
    match DateTime::parse_from_rfc3339(t) {
        Ok(dt) => dt.date_naive().to_string(),
        Err(_) => t.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_with_trailing_text() {
        assert_eq!(parse_price("$45,Buy Now"), Some(45.0));
    }

    #[test]
    fn price_plain() {
        assert_eq!(parse_price("$32.99"), Some(32.99));
    }

    #[test]
    fn price_malformed() {
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price("$ask,"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn alcohol_percent_stripped() {
        assert_eq!(parse_alcohol("14.5%"), Some(14.5));
        assert_eq!(parse_alcohol("13%"), Some(13.0));
    }

    #[test]
    fn alcohol_malformed() {
        assert_eq!(parse_alcohol("unknown"), None);
    }

    #[test]
    fn bottle_size_ml() {
        assert_eq!(parse_bottle_size_ml("750 ml"), Some(750.0));
    }

    #[test]
    fn bottle_size_liters() {
        assert_eq!(parse_bottle_size_ml("1.5 L"), Some(1500.0));
    }

    #[test]
    fn bottle_size_unknown_unit() {
        assert_eq!(parse_bottle_size_ml("1 magnum"), None);
        assert_eq!(parse_bottle_size_ml("12 oz"), None);
        assert_eq!(parse_bottle_size_ml("750"), None);
    }

    #[test]
    fn price_per_ml() {
        assert_eq!(price_per_milliliter(Some(45.0), Some(750.0)), Some(0.06));
        assert_eq!(price_per_milliliter(None, Some(750.0)), None);
        assert_eq!(price_per_milliliter(Some(45.0), None), None);
    }

    #[test]
    fn date_rfc3339() {
        assert_eq!(normalize_date("2021-05-04T15:28:31+00:00"), "2021-05-04");
    }

    #[test]
    fn date_unparseable_kept() {
        assert_eq!(normalize_date("May 4, 2021"), "May 4, 2021");
    }
}
