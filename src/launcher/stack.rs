//! File locations and the launcher's configuration stack.

use crate::core::{ConfigKey, LayeredConfig};
use crate::error::Result;
use crate::launcher::options;
use std::path::{Path, PathBuf};

/// Vendor directory under the per-user application data root.
pub const VENDOR: &str = "Megasware128";
/// Application directory under the vendor directory.
pub const APP_NAME: &str = "HalfLifeLauncher";
/// Name of the persisted settings file.
pub const SETTINGS_FILE_NAME: &str = "settings.ini";
/// Name of the optional base file shipped next to the executable.
pub const BASE_FILE_NAME: &str = "appsettings.json";
/// Prefix of environment overrides (`HL_MAP=crossfire`).
pub const ENV_PREFIX: &str = "HL";

/// Where the launcher keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    /// The writable `key=value` settings file.
    pub settings_file: PathBuf,
    /// The read-only base file, if one should be consulted.
    pub base_file: Option<PathBuf>,
}

impl LauncherPaths {
    /// Compose the standard locations.
    ///
    /// # Arguments
    ///
    /// * `app_data_root` - Per-user application data directory
    /// * `executable` - Path of the running executable, if known
    pub fn new(app_data_root: &Path, executable: Option<&Path>) -> Self {
        Self {
            settings_file: app_data_root
                .join(VENDOR)
                .join(APP_NAME)
                .join(SETTINGS_FILE_NAME),
            base_file: executable
                .and_then(Path::parent)
                .map(|dir| dir.join(BASE_FILE_NAME)),
        }
    }
}

/// Build the launcher's configuration stack.
///
/// Layers, lowest precedence first: built-in defaults, the base file
/// (optional), the settings file (optional, write target), `HL_*`
/// environment variables, and the command-line overlay.
pub fn build_config<K, V>(
    paths: &LauncherPaths,
    overlay: impl IntoIterator<Item = (K, V)>,
) -> Result<LayeredConfig>
where
    K: Into<ConfigKey>,
    V: Into<String>,
{
    let mut builder = LayeredConfig::builder().with_defaults(options::defaults());
    if let Some(base_file) = &paths.base_file {
        builder = builder.with_optional_file(base_file);
    }
    builder
        .with_settings_file(&paths.settings_file, true, false)
        .with_env_overrides(ENV_PREFIX, "__")
        .with_overlay("cli", overlay)
        .build()
}
