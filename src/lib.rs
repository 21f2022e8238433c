//! # halflife-launcher
//!
//! A Half-Life launcher built around a layered configuration store.
//!
//! ## Overview
//!
//! The configuration store merges several named sources into one key-value
//! view:
//! - Built-in defaults, structured base files and environment variables
//! - A user-editable `key=value` settings file that receives every write
//! - A command-line overlay with the highest precedence
//!
//! Later sources override earlier ones. Writes go through to the settings
//! file immediately, one appended line per write.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use halflife_launcher::prelude::*;
//!
//! # fn example() -> halflife_launcher::error::Result<()> {
//! let config = LayeredConfig::builder()
//!     .with_defaults([("Game", "decay"), ("Map", "dy_accident1")])
//!     .with_optional_file("appsettings.json")
//!     .with_settings_file("settings.ini", true, false)
//!     .with_overlay("cli", [("Map", "crossfire")])
//!     .build()?;
//!
//! config.set("Game", "gearbox")?;
//! println!("Playing {} on {}", config.get("Game").unwrap(), config.get("Map").unwrap());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `file-watch` (default): reload sources when their files change
//! - `ip-lookup`: local and public IP address lookup
//! - `cli` (default): the `hl-launcher` binary

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod codec;
pub mod core;
pub mod error;
pub mod launcher;
pub mod notify;
pub mod sources;

#[cfg(feature = "cli")]
pub mod cli;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{ConfigKey, LayeredConfig, LayeredConfigBuilder, Snapshot, SourceId};
    pub use crate::error::{ConfigError, Result};
    pub use crate::sources::{ConfigSource, MemorySource, SettingsFileSource};
}
