use std::collections::HashMap;

use super::Flag;

/// Working map for one review page: raw label/JSON-path keys to raw string
/// values, assembled from the card, both info lists, and the structured-data
/// block before projection into a typed row.
///
/// Keys are not namespaced between sources, so later sources can collide with
/// earlier ones. Resolution is last-writer-wins; `merge` records the collision.
#[derive(Debug, Default)]
pub struct ScrapedInfo {
    map: HashMap<String, String>,
}

impl ScrapedInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain insert, no collision check. Used for card seeding and the
    /// primary-info rows.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    /// Insert that records `DuplicateKeyOnMerge` once per overwrite of an
    /// already-present key, then overwrites. Used for secondary-info rows and
    /// structured-data fields so the later source wins.
    pub fn merge(&mut self, key: impl Into<String>, value: impl Into<String>, flags: &mut Vec<Flag>) {
        let key = key.into();
        if self.map.contains_key(&key) {
            flags.push(Flag::DuplicateKeyOnMerge);
        }
        self.map.insert(key, value.into());
    }

    /// Silent overwrite. Used for the published-time meta, which always takes
    /// precedence without counting as an anomaly.
    pub fn overwrite(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }
}
