//! In-memory configuration source.

use super::ConfigSource;
use crate::core::{ConfigKey, Snapshot};
use crate::error::Result;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Read-only, in-memory configuration source.
///
/// Used for built-in defaults and for the command-line overlay.
///
/// # Examples
///
/// ```rust
/// use halflife_launcher::sources::{ConfigSource, MemorySource};
///
/// let defaults = MemorySource::new("defaults")
///     .with_value("Game", "decay")
///     .with_value("MaxPlayers", "3");
/// assert_eq!(defaults.get(&"game".into()), Some("decay".to_string()));
/// ```
pub struct MemorySource {
    name: String,
    values: Snapshot,
    current: ArcSwap<Snapshot>,
}

impl MemorySource {
    /// Create an empty memory source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Snapshot::new(),
            current: ArcSwap::from_pointee(Snapshot::new()),
        }
    }

    /// Create a memory source from key-value pairs.
    pub fn from_pairs<K, V>(name: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<ConfigKey>,
        V: Into<String>,
    {
        let values: Snapshot = pairs.into_iter().collect();
        Self {
            name: name.into(),
            current: ArcSwap::from_pointee(values.clone()),
            values,
        }
    }

    /// Add a value.
    pub fn with_value(mut self, key: impl Into<ConfigKey>, value: impl Into<String>) -> Self {
        self.values.insert(key, value);
        self.current.store(Arc::new(self.values.clone()));
        self
    }
}

impl ConfigSource for MemorySource {
    fn name(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn read(&self) -> Result<Snapshot> {
        Ok(self.values.clone())
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    fn install(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_from_pairs() {
        let source = MemorySource::from_pairs("cli", [("Map", "crossfire"), ("Lan", "true")]);
        assert_eq!(source.get(&"map".into()), Some("crossfire".to_string()));
        assert_eq!(source.get(&"Game".into()), None);
    }

    #[test]
    fn test_read_only() {
        let source = MemorySource::new("defaults");
        assert!(!source.is_writable());
        let result = source.set(&"Map".into(), "crossfire");
        assert!(matches!(result, Err(ConfigError::ReadOnlySource(name)) if name == "memory:defaults"));
    }

    #[test]
    fn test_not_file_backed() {
        let source = MemorySource::new("defaults");
        assert!(source.watch_path().is_none());
        assert!(!source.reload_on_change());
    }
}
