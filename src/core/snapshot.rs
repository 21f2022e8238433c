//! In-memory key-value snapshots held by each source.

use std::collections::HashMap;

use crate::core::ConfigKey;

/// An insertion-ordered mapping of keys to string values.
///
/// Each source owns one snapshot at a time. Keys are unique per snapshot:
/// inserting an existing key (in any casing) replaces its value in place and
/// keeps the first spelling and position.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: Vec<(ConfigKey, String)>,
    index: HashMap<ConfigKey, usize>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value.
    pub fn get(&self, key: &ConfigKey) -> Option<&str> {
        self.index
            .get(key)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    /// Whether the key is present (possibly with an empty value).
    pub fn contains_key(&self, key: &ConfigKey) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<ConfigKey>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &ConfigKey> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Snapshot {}

impl<K, V> FromIterator<(K, V)> for Snapshot
where
    K: Into<ConfigKey>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        snapshot.extend(iter);
        snapshot
    }
}

impl<K, V> Extend<(K, V)> for Snapshot
where
    K: Into<ConfigKey>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a ConfigKey, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a ConfigKey, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
