//! The layered configuration provider.

use crate::core::{ConfigKey, LayeredConfigBuilder, Snapshot};
use crate::error::{ConfigError, Result};
use crate::notify::{SubscriberRegistry, SubscriptionHandle};
use crate::sources::ConfigSource;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(feature = "file-watch")]
use crate::notify::ConfigWatcher;
#[cfg(feature = "file-watch")]
use std::{collections::HashMap, path::PathBuf, time::Duration};
#[cfg(feature = "file-watch")]
use tracing::info;

/// Stable handle for a source registered with a [`LayeredConfig`].
///
/// Ids are assigned in registration order and stay valid when other sources
/// are inserted before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub(crate) usize);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Layer {
    id: SourceId,
    source: Arc<dyn ConfigSource>,
}

/// One key-value view over an ordered stack of configuration sources.
///
/// Sources are ordered by precedence: a source added later overrides
/// earlier ones for every key it defines. Reads return the value from the
/// highest-precedence source defining the key; writes go to a single write
/// target.
///
/// The provider is meant to be built once and then shared. Reads, writes and
/// reloads take `&self`; changing the stack itself requires `&mut self`.
///
/// # Examples
///
/// ```rust,no_run
/// use halflife_launcher::prelude::*;
///
/// # fn example() -> Result<()> {
/// let config = LayeredConfig::builder()
///     .with_defaults([("Game", "decay"), ("Map", "dy_accident1")])
///     .with_optional_file("appsettings.json")
///     .with_settings_file("settings.ini", true, false)
///     .build()?;
///
/// config.set("Game", "gearbox")?;
/// assert_eq!(config.get("game").as_deref(), Some("gearbox"));
/// # Ok(())
/// # }
/// ```
pub struct LayeredConfig {
    layers: Vec<Layer>,
    write_target: Option<SourceId>,
    next_id: usize,
    subscribers: SubscriberRegistry,
}

impl LayeredConfig {
    /// Create a provider with no sources.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            write_target: None,
            next_id: 0,
            subscribers: SubscriberRegistry::new(),
        }
    }

    /// Create a new builder for constructing a provider.
    pub fn builder() -> LayeredConfigBuilder {
        LayeredConfigBuilder::new()
    }

    /// Load a source and add it with the highest precedence so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails to load, e.g. a required file is
    /// missing.
    pub fn add_source<S: ConfigSource + 'static>(&mut self, source: S) -> Result<SourceId> {
        self.insert_shared(self.layers.len(), Arc::new(source))
    }

    /// Load a source and insert it at `position` in the precedence order.
    ///
    /// Position 0 is the lowest precedence. Positions past the end append.
    pub fn insert_source<S: ConfigSource + 'static>(
        &mut self,
        position: usize,
        source: S,
    ) -> Result<SourceId> {
        self.insert_shared(position, Arc::new(source))
    }

    /// Load an already shared source and insert it at `position`.
    pub fn insert_shared(
        &mut self,
        position: usize,
        source: Arc<dyn ConfigSource>,
    ) -> Result<SourceId> {
        source.load()?;

        let id = SourceId(self.next_id);
        self.next_id += 1;
        let position = position.min(self.layers.len());
        debug!(source = %source.name(), %id, position, "added configuration source");
        self.layers.insert(position, Layer { id, source });
        Ok(id)
    }

    /// Route all writes to the given source.
    ///
    /// # Errors
    ///
    /// Fails if the id is unknown or the source is read-only.
    pub fn set_write_target(&mut self, id: SourceId) -> Result<()> {
        let source = &self.layer(id)?.source;
        if !source.is_writable() {
            return Err(ConfigError::ReadOnlySource(source.name()));
        }
        self.write_target = Some(id);
        Ok(())
    }

    /// The source that receives writes.
    ///
    /// This is the explicitly designated target, or else the writable source
    /// with the highest precedence.
    pub fn write_target(&self) -> Option<SourceId> {
        self.write_target.or_else(|| {
            self.layers
                .iter()
                .rev()
                .find(|layer| layer.source.is_writable())
                .map(|layer| layer.id)
        })
    }

    /// Get the effective value for a key.
    ///
    /// Returns `None` when no source defines the key. A key defined with an
    /// empty value yields `Some("")`.
    pub fn get(&self, key: impl Into<ConfigKey>) -> Option<String> {
        let key = key.into();
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.source.get(&key))
    }

    /// Get the effective value for a key and parse it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if the value is present but does
    /// not parse as `T`.
    pub fn get_parsed<T>(&self, key: impl Into<ConfigKey>) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let key = key.into();
        self.get(&key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::parse(key.as_str(), e))
            })
            .transpose()
    }

    /// Write a value through to the write target.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoWritableSource`] if no source accepts writes,
    /// or the error of the underlying write.
    pub fn set(&self, key: impl Into<ConfigKey>, value: impl AsRef<str>) -> Result<()> {
        let id = self.write_target().ok_or(ConfigError::NoWritableSource)?;
        let key = key.into();
        self.layer(id)?.source.set(&key, value.as_ref())
    }

    /// Re-read a source from its backing store and swap in the result.
    ///
    /// On failure the previous snapshot stays in effect. Subscribers are
    /// notified after a successful reload.
    pub fn reload(&self, id: SourceId) -> Result<()> {
        let source = &self.layer(id)?.source;
        source.load()?;
        debug!(source = %source.name(), %id, "reloaded configuration source");
        self.subscribers.notify_all(id);
        Ok(())
    }

    /// Re-read a source on a blocking worker and swap in the result.
    ///
    /// The new snapshot is installed only after the read has finished, so
    /// dropping the returned future abandons the reload without changing
    /// anything. Subscribers are notified after a successful reload.
    #[cfg(feature = "file-watch")]
    pub async fn reload_async(&self, id: SourceId) -> Result<()> {
        let source = Arc::clone(&self.layer(id)?.source);
        let reader = Arc::clone(&source);
        let snapshot = tokio::task::spawn_blocking(move || reader.read())
            .await
            .map_err(|e| ConfigError::Other(format!("Reload task failed: {}", e)))??;

        source.install(snapshot);
        debug!(source = %source.name(), %id, "reloaded configuration source");
        self.subscribers.notify_all(id);
        Ok(())
    }

    /// The merged view of every source, highest precedence winning.
    pub fn entries(&self) -> Snapshot {
        let mut merged = Snapshot::new();
        for layer in &self.layers {
            for (key, value) in layer.source.snapshot().iter() {
                merged.insert(key.clone(), value);
            }
        }
        merged
    }

    /// Source names in precedence order, lowest first.
    pub fn source_names(&self) -> Vec<String> {
        self.layers.iter().map(|layer| layer.source.name()).collect()
    }

    /// Source ids in precedence order, lowest first.
    pub fn source_ids(&self) -> Vec<SourceId> {
        self.layers.iter().map(|layer| layer.id).collect()
    }

    /// Look up a registered source.
    pub fn source(&self, id: SourceId) -> Option<&Arc<dyn ConfigSource>> {
        self.layers
            .iter()
            .find(|layer| layer.id == id)
            .map(|layer| &layer.source)
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Dispose every source, releasing open file handles.
    ///
    /// All sources are disposed even if one fails; the first error is
    /// returned.
    pub fn dispose(&self) -> Result<()> {
        let mut first_error = None;
        for layer in &self.layers {
            if let Err(e) = layer.source.dispose() {
                warn!(source = %layer.source.name(), error = %e, "failed to dispose configuration source");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Subscribe to reloads.
    ///
    /// The callback receives the id of each source after it has been
    /// reloaded, whether by [`reload`](Self::reload), `reload_async` or the
    /// file watcher. Drop the handle to unsubscribe.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(SourceId) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Start reloading sources whose backing files change on disk.
    ///
    /// Only sources with `reload_on_change` and a backing file take part;
    /// other sources never fire. A file whose directory does not exist yet
    /// (the settings file before its first write) is skipped with a
    /// warning. Bursts of changes to one file within
    /// `debounce` collapse into a single reload. Failed reloads are logged
    /// and leave the previous snapshot in place.
    ///
    /// Watching stops when the returned handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file watcher cannot be created or a directory
    /// cannot be watched.
    #[cfg(feature = "file-watch")]
    pub async fn watch(self: &Arc<Self>, debounce: Duration) -> Result<WatchHandle> {
        let (watcher, mut rx) = ConfigWatcher::new(debounce)?;

        let mut targets: HashMap<PathBuf, Vec<SourceId>> = HashMap::new();
        for layer in &self.layers {
            if !layer.source.reload_on_change() {
                continue;
            }
            let Some(path) = layer.source.watch_path() else {
                continue;
            };
            if !parent_exists(path) {
                warn!(
                    id = %layer.id,
                    path = %path.display(),
                    "directory of configuration file does not exist, not watching it"
                );
                continue;
            }
            let watched = watcher.watch(path).await?;
            targets.entry(watched).or_default().push(layer.id);
        }
        debug!(files = targets.len(), "watching configuration files");

        let config = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            while let Some(path) = rx.recv().await {
                let Some(config) = config.upgrade() else {
                    break;
                };
                for &id in targets.get(&path).into_iter().flatten() {
                    match config.reload_async(id).await {
                        Ok(()) => info!(%id, path = %path.display(), "configuration file changed, reloaded"),
                        Err(e) => warn!(%id, path = %path.display(), error = %e, "failed to reload configuration file"),
                    }
                }
            }
        });

        Ok(WatchHandle { watcher, task })
    }

    fn layer(&self, id: SourceId) -> Result<&Layer> {
        self.layers
            .iter()
            .find(|layer| layer.id == id)
            .ok_or(ConfigError::UnknownSource(id))
    }
}

#[cfg(feature = "file-watch")]
fn parent_exists(path: &std::path::Path) -> bool {
    path.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .is_none_or(|dir| dir.is_dir())
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LayeredConfig {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}

/// Keeps file watching alive for a [`LayeredConfig`].
#[cfg(feature = "file-watch")]
pub struct WatchHandle {
    watcher: ConfigWatcher,
    task: tokio::task::JoinHandle<()>,
}

#[cfg(feature = "file-watch")]
impl WatchHandle {
    /// Files currently being watched.
    pub async fn watched_paths(&self) -> Vec<PathBuf> {
        self.watcher.watched_paths().await
    }
}

#[cfg(feature = "file-watch")]
impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
