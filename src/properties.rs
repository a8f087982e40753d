//! Deployment-time property map
//!
//! Profiles receive their tuning knobs as a `"key=value|key=value"` string
//! from the encoder registry. Missing or malformed values fall back to the
//! caller's default; properties are deployment inputs, not user errors.

use std::str::FromStr;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: FxHashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `"key=value|key=value"` string. Segments without `=` are
    /// skipped.
    pub fn parse_str(input: &str) -> Self {
        let mut props = Self::new();
        for part in input.split('|') {
            if let Some((key, value)) = part.split_once('=') {
                props.set(key.trim(), value.trim());
            }
        }
        props
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    pub fn get_u32(&self, key: &str, default: u32) -> u32 {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }
}

impl FromStr for Properties {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_str(s))
    }
}
