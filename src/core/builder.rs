//! Builder for constructing LayeredConfig instances.

use crate::core::{ConfigKey, LayeredConfig};
use crate::error::Result;
use crate::sources::{ConfigSource, EnvSource, FileSource, MemorySource, SettingsFileSource};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for constructing a `LayeredConfig` instance.
///
/// Sources are stacked in the order they are added: each one overrides the
/// ones added before it.
///
/// # Examples
///
/// ```rust,no_run
/// use halflife_launcher::prelude::*;
///
/// # fn example() -> Result<()> {
/// let config = LayeredConfig::builder()
///     .with_defaults([("Game", "decay")])
///     .with_file("appsettings.json")
///     .with_settings_file("settings.ini", true, false)
///     .with_env_overrides("HL", "__")
///     .with_overlay("cli", [("Map", "crossfire")])
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct LayeredConfigBuilder {
    sources: Vec<Arc<dyn ConfigSource>>,
    write_target: Option<usize>,
}

impl LayeredConfigBuilder {
    /// Create a new builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            write_target: None,
        }
    }

    /// Add built-in default values.
    pub fn with_defaults<K, V>(self, defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<ConfigKey>,
        V: Into<String>,
    {
        self.with_source(MemorySource::from_pairs("defaults", defaults))
    }

    /// Add a required structured file (JSON, TOML or YAML).
    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_source(FileSource::new(path))
    }

    /// Add a structured file that may be absent.
    pub fn with_optional_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_source(FileSource::new(path).optional(true))
    }

    /// Add the settings file and make it the write target.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the `key=value` settings file
    /// * `optional` - Start empty instead of failing when the file is missing
    /// * `reload_on_change` - Reload when the file changes on disk (needs
    ///   [`LayeredConfig::watch`])
    pub fn with_settings_file(
        mut self,
        path: impl Into<PathBuf>,
        optional: bool,
        reload_on_change: bool,
    ) -> Self {
        self.write_target = Some(self.sources.len());
        self.with_source(
            SettingsFileSource::new(path)
                .optional(optional)
                .reload_on_change(reload_on_change),
        )
    }

    /// Add environment variable overrides.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Prefix for environment variables (e.g., "HL")
    /// * `separator` - Separator for nested keys (e.g., "__")
    pub fn with_env_overrides(self, prefix: &str, separator: &str) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Add a named, read-only overlay such as parsed command-line options.
    pub fn with_overlay<K, V>(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<ConfigKey>,
        V: Into<String>,
    {
        self.with_source(MemorySource::from_pairs(name, values))
    }

    /// Add a custom configuration source.
    pub fn with_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Build the provider.
    ///
    /// This loads every source in order.
    ///
    /// # Errors
    ///
    /// Returns the first load error, e.g. a required file that is missing.
    pub fn build(self) -> Result<LayeredConfig> {
        let mut config = LayeredConfig::new();
        let mut ids = Vec::with_capacity(self.sources.len());
        for source in self.sources {
            ids.push(config.insert_shared(usize::MAX, source)?);
        }

        if let Some(index) = self.write_target {
            config.set_write_target(ids[index])?;
        }

        Ok(config)
    }
}

impl Default for LayeredConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use tempfile::TempDir;

    #[test]
    fn test_builder_accumulates_sources() {
        let builder = LayeredConfigBuilder::new()
            .with_defaults([("Game", "decay")])
            .with_optional_file("appsettings.json")
            .with_overlay("cli", [("Map", "crossfire")]);

        assert_eq!(builder.sources.len(), 3);
        assert_eq!(builder.write_target, None);
    }

    #[test]
    fn test_builder_marks_settings_file_as_target() {
        let builder = LayeredConfigBuilder::new()
            .with_defaults([("Game", "decay")])
            .with_settings_file("settings.ini", true, false)
            .with_overlay("cli", [("Map", "crossfire")]);

        assert_eq!(builder.write_target, Some(1));
    }

    #[test]
    fn test_build_loads_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let config = LayeredConfigBuilder::new()
            .with_defaults([("Game", "decay"), ("Map", "dy_accident1")])
            .with_settings_file(temp_dir.path().join("settings.ini"), true, false)
            .with_overlay("cli", [("Map", "crossfire")])
            .build()
            .unwrap();

        assert_eq!(config.len(), 3);
        assert_eq!(config.get("Game").as_deref(), Some("decay"));
        assert_eq!(config.get("Map").as_deref(), Some("crossfire"));
        assert_eq!(config.write_target(), Some(config.source_ids()[1]));
    }

    #[test]
    fn test_build_fails_on_missing_required_file() {
        let result = LayeredConfigBuilder::new()
            .with_file("/nonexistent/appsettings.json")
            .build();
        assert!(matches!(result, Err(ConfigError::MissingRequiredSource(_))));
    }
}
