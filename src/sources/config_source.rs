//! Configuration source trait.

use crate::core::{ConfigKey, Snapshot};
use crate::error::{ConfigError, Result};
use std::path::Path;
use std::sync::Arc;

/// Trait for configuration sources.
///
/// A source owns one [`Snapshot`] of key-value pairs. The provider reads
/// through [`get`](ConfigSource::get) and only ever changes a source through
/// [`set`](ConfigSource::set) or a reload; it never touches the snapshot
/// directly.
///
/// Reloading is split in two steps so callers can abandon a reload halfway:
/// [`read`](ConfigSource::read) produces a fresh snapshot from the backing
/// store without changing the source, and [`install`](ConfigSource::install)
/// swaps it in.
pub trait ConfigSource: Send + Sync {
    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;

    /// Read the backing store into a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read, or if it is required
    /// and its backing file is missing.
    fn read(&self) -> Result<Snapshot>;

    /// The snapshot currently in effect.
    fn snapshot(&self) -> Arc<Snapshot>;

    /// Atomically replace the current snapshot.
    fn install(&self, snapshot: Snapshot);

    /// Read the backing store and install the result.
    fn load(&self) -> Result<()> {
        let snapshot = self.read()?;
        self.install(snapshot);
        Ok(())
    }

    /// Look up a key in the current snapshot.
    fn get(&self, key: &ConfigKey) -> Option<String> {
        self.snapshot().get(key).map(str::to_owned)
    }

    /// Write a value through to this source.
    ///
    /// # Errors
    ///
    /// Read-only sources return [`ConfigError::ReadOnlySource`].
    fn set(&self, key: &ConfigKey, value: &str) -> Result<()> {
        let _ = (key, value);
        Err(ConfigError::ReadOnlySource(self.name()))
    }

    /// Whether [`set`](ConfigSource::set) is supported.
    fn is_writable(&self) -> bool {
        false
    }

    /// The file backing this source, if any.
    fn watch_path(&self) -> Option<&Path> {
        None
    }

    /// Whether the source asked to be reloaded when its file changes.
    fn reload_on_change(&self) -> bool {
        false
    }

    /// Release any resources held for writing.
    fn dispose(&self) -> Result<()> {
        Ok(())
    }
}
