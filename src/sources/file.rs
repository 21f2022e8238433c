//! Structured base-file configuration source.

use super::ConfigSource;
use crate::core::{ConfigKey, Snapshot};
use crate::error::{ConfigError, Result};
use arc_swap::ArcSwap;
use config::{File, Value, ValueKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Read-only source backed by a JSON, TOML or YAML file.
///
/// Nested tables are flattened into `:`-separated keys and array items are
/// addressed by index, so `{"Servers": [{"Address": "a"}]}` yields
/// `Servers:0:Address=a`. Scalars are stored as their textual form and
/// `null` as an empty string.
///
/// # Examples
///
/// ```rust,no_run
/// use halflife_launcher::sources::FileSource;
///
/// let source = FileSource::new("appsettings.json").optional(true);
/// ```
pub struct FileSource {
    path: PathBuf,
    optional: bool,
    reload_on_change: bool,
    current: ArcSwap<Snapshot>,
}

impl FileSource {
    /// Create a new file source with automatic format detection.
    ///
    /// The format is detected from the file extension:
    /// - `.json` -> JSON
    /// - `.toml` -> TOML
    /// - `.yaml`, `.yml` -> YAML
    ///
    /// The source starts empty; it is read when added to a provider.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: false,
            reload_on_change: false,
            current: ArcSwap::from_pointee(Snapshot::new()),
        }
    }

    /// Tolerate a missing file by loading an empty snapshot.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Reload this source when the file changes on disk.
    pub fn reload_on_change(mut self, enabled: bool) -> Self {
        self.reload_on_change = enabled;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate that the file extension is supported.
    fn validate_extension(&self) -> Result<()> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!(
                    "Unable to determine file format for: {}",
                    self.path.display()
                ))
            })?;

        match extension {
            "json" | "toml" | "yaml" | "yml" => Ok(()),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}. Supported: .json, .toml, .yaml, .yml",
                extension
            ))),
        }
    }
}

impl ConfigSource for FileSource {
    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn read(&self) -> Result<Snapshot> {
        self.validate_extension()?;

        if !self.path.exists() {
            if self.optional {
                debug!(path = %self.path.display(), "optional base file not found");
                return Ok(Snapshot::new());
            }
            return Err(ConfigError::MissingRequiredSource(self.path.clone()));
        }

        let parsed = config::Config::builder()
            .add_source(File::from(self.path.clone()).required(true))
            .build()
            .map_err(|e| ConfigError::LoadError(format!("Failed to load file: {}", e)))?;

        let map = parsed
            .try_deserialize::<HashMap<String, Value>>()
            .map_err(|e| ConfigError::LoadError(format!("Failed to parse file: {}", e)))?;

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

    fn watch_path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn reload_on_change(&self) -> bool {
        self.reload_on_change
    }
}

/// Flatten a structured value into `:`-separated keys.
pub(crate) fn flatten(key: ConfigKey, value: Value, out: &mut Snapshot) {
    match value.kind {
        ValueKind::Table(table) => {
            for (name, child) in table {
                flatten(key.child(&name), child, out);
            }
        }
        ValueKind::Array(items) => {
            for (idx, child) in items.into_iter().enumerate() {
                flatten(key.child(&idx.to_string()), child, out);
            }
        }
        ValueKind::Nil => {
            out.insert(key, String::new());
        }
        ValueKind::String(s) => {
            out.insert(key, s);
        }
        ValueKind::Boolean(b) => {
            out.insert(key, b.to_string());
        }
        ValueKind::I64(n) => {
            out.insert(key, n.to_string());
        }
        ValueKind::I128(n) => {
            out.insert(key, n.to_string());
        }
        ValueKind::U64(n) => {
            out.insert(key, n.to_string());
        }
        ValueKind::U128(n) => {
            out.insert(key, n.to_string());
        }
        ValueKind::Float(n) => {
            out.insert(key, n.to_string());
        }
    }
}
