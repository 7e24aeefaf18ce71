//! Backing Store Module
//!
//! The untyped key-value seam between typed properties and whatever actually
//! holds the data. Callers implement [`PropertyStore`] for their context type;
//! [`PropertyMap`] is a ready-made in-memory implementation in the style of a
//! flat properties file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// == Property Store Trait ==
/// Raw read/write access to a string-keyed store.
///
/// Every property operation goes through this pair. Writing `None` clears the
/// key. Implementations may fail (e.g. a store backed by I/O); failures are
/// propagated to the caller unchanged.
pub trait PropertyStore {
    /// Reads the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Writes `value` under `key`, or removes the key when `value` is `None`.
    fn write(&mut self, key: &str, value: Option<&str>) -> anyhow::Result<()>;
}

// == Property Map ==
/// In-memory string-keyed store, ordered by key.
///
/// Serves as the default context for property definitions and as the reference
/// implementation of [`PropertyStore`] in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap {
    entries: BTreeMap<String, String>,
}

impl PropertyMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `key=value` lines into a map.
    ///
    /// Blank lines and lines starting with `#` are skipped. A line without a
    /// separator becomes a key with an empty value.
    pub fn from_lines(text: &str) -> Self {
        let mut map = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => map.insert(key.trim(), value.trim()),
                None => map.insert(line, ""),
            }
        }
        map
    }

    /// Inserts or overwrites a raw entry.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    /// Returns the raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Removes an entry, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Iterates over all keys in order, tracking keys included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over all `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertyStore for PropertyMap {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: Option<&str>) -> anyhow::Result<()> {
        match value {
            Some(value) => {
                self.entries.insert(key.to_string(), value.to_string());
            }
            None => {
                self.entries.remove(key);
            }
        }
        Ok(())
    }
}
