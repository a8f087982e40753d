//! Tag-bag way abstraction
//!
//! A way is an opaque set of string key/value tags as produced by an OSM
//! reader. Only tag lookups matter here; identity and geometry belong to the
//! surrounding pipeline.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::tagset::TagSet;

/// Read-only tag set of a single way. Supplied per call, never retained.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct WayTags {
    tags: FxHashMap<String, String>,
}

impl WayTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(|v| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    pub fn has_value(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// Key present with a value in `values`.
    pub fn has_any(&self, key: &str, values: &TagSet) -> bool {
        self.get(key).is_some_and(|v| values.contains(v))
    }

    /// Effective speed limit in km/h, `0.0` when absent.
    ///
    /// Takes the maximum over `maxspeed`, `maxspeed:forward` and
    /// `maxspeed:backward`; non-numeric values (`none`, `signals`, ...)
    /// contribute nothing.
    pub fn max_speed(&self) -> f64 {
        ["maxspeed", "maxspeed:forward", "maxspeed:backward"]
            .iter()
            .filter_map(|key| self.get(key).and_then(parse_speed))
            .fold(0.0, f64::max)
    }
}

impl FromIterator<(String, String)> for WayTags {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for WayTags {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// Parse an OSM speed value into km/h. Bare numbers are km/h; `mph` and
/// `knots` suffixes are converted.
fn parse_speed(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Some(mph) = value.strip_suffix("mph") {
        return mph.trim().parse::<f64>().ok().map(|s| s * 1.609344);
    }
    if let Some(knots) = value.strip_suffix("knots") {
        return knots.trim().parse::<f64>().ok().map(|s| s * 1.852);
    }
    value.parse::<f64>().ok()
}
