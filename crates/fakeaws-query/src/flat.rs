//! Flat key/value sets and `application/x-www-form-urlencoded` bodies

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ops::Bound;

use crate::error::ParseError;

/// Dotted-path keys mapped to their raw string values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatKeyValueSet {
    entries: BTreeMap<String, String>,
}

impl FlatKeyValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a form-encoded request body.
    ///
    /// The first occurrence of a repeated key wins.
    pub fn parse(body: &[u8]) -> Result<Self, ParseError> {
        let body = std::str::from_utf8(body)?;
        let mut set = Self::new();

        for pair in body.split('&') {
            if pair.is_empty() {
                continue;
            }
            if pair.contains(';') {
                return Err(ParseError::Semicolon {
                    pair: pair.to_string(),
                });
            }
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = unescape(raw_key)?;
            let value = unescape(raw_value)?;

            if let Entry::Vacant(slot) = set.entries.entry(key) {
                slot.insert(value);
            }
        }

        Ok(set)
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True if some key equals `prefix` or continues it with a `.` segment.
    /// The empty prefix denotes the root and matches any non-empty set.
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return !self.entries.is_empty();
        }
        if self.entries.contains_key(prefix) {
            return true;
        }
        let nested = format!("{prefix}.");
        self.entries
            .range::<str, _>((Bound::Included(nested.as_str()), Bound::Unbounded))
            .next()
            .is_some_and(|(key, _)| key.starts_with(&nested))
    }

    /// Render as a form body, percent-encoding keys and values
    pub fn to_form_body(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for FlatKeyValueSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

fn unescape(raw: &str) -> Result<String, ParseError> {
    let bytes = raw.as_bytes();
    for (i, byte) in bytes.iter().enumerate() {
        if *byte == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(ParseError::Escape {
                    fragment: raw.to_string(),
                });
            }
        }
    }

    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(ParseError::Utf8)
}
