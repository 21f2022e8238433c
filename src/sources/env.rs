//! Environment variable configuration source.

use super::ConfigSource;
use super::file::flatten;
use crate::core::{ConfigKey, Snapshot};
use crate::error::{ConfigError, Result};
use arc_swap::ArcSwap;
use config::Environment;
use std::collections::HashMap;
use std::sync::Arc;

/// Environment variable configuration source.
///
/// Loads variables carrying a prefix; the separator marks nesting, which is
/// mapped onto `:`-separated keys. Keys are matched case-insensitively, so
/// `HL_MAXPLAYERS=8` overrides `MaxPlayers`.
///
/// # Examples
///
/// ```rust
/// use halflife_launcher::sources::EnvSource;
///
/// // HL_GAME=gearbox -> Game = gearbox
/// let source = EnvSource::new("HL", "__");
/// ```
pub struct EnvSource {
    prefix: String,
    separator: String,
    current: ArcSwap<Snapshot>,
}

impl EnvSource {
    /// Create a new environment variable source.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "HL")
    /// * `separator` - Separator for nested keys (e.g., "__" for HL_LOGGING__LEVEL)
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
            current: ArcSwap::from_pointee(Snapshot::new()),
        }
    }
}

impl ConfigSource for EnvSource {
    fn name(&self) -> String {
        format!("env:{}*", self.prefix)
    }

    fn read(&self) -> Result<Snapshot> {
        let env_source = Environment::with_prefix(&self.prefix)
            .prefix_separator("_")
            .separator(&self.separator);

        let loaded = config::Config::builder()
            .add_source(env_source)
            .build()
            .map_err(|e| {
                ConfigError::LoadError(format!("Failed to load environment variables: {}", e))
            })?;

        let map = loaded
            .try_deserialize::<HashMap<String, config::Value>>()
            .map_err(|e| {
                ConfigError::LoadError(format!("Failed to parse environment variables: {}", e))
            })?;

        let mut snapshot = Snapshot::new();
        for (key, value) in map {
            flatten(ConfigKey::new(key), value, &mut snapshot);
        }
        Ok(snapshot)
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    fn install(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }
}

#[cfg(test)]
#[allow(unsafe_code)] // For env var manipulation in tests
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_name() {
        let source = EnvSource::new("HL", "__");
        assert_eq!(source.name(), "env:HL*");
    }

    #[test]
    fn test_load_prefixed_variables() {
        unsafe {
            env::set_var("HLTEST_ENV_GAME", "gearbox");
        }

        let snapshot = EnvSource::new("HLTEST_ENV", "__").read().unwrap();
        assert_eq!(snapshot.get(&"Game".into()), Some("gearbox"));

        unsafe {
            env::remove_var("HLTEST_ENV_GAME");
        }
    }

    #[test]
    fn test_load_without_matches() {
        let snapshot = EnvSource::new("HLTEST_NONEXISTENT", "__").read().unwrap();
        assert!(snapshot.is_empty());
    }
}
