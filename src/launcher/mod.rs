//! The Half-Life launcher built on the layered configuration store.

pub mod game;
pub mod options;
pub mod process;
pub mod stack;

#[cfg(feature = "ip-lookup")]
pub mod ip;

pub use game::GameDirectory;
pub use options::{LaunchOptions, keys};
pub use process::{LaunchError, Launcher, ProcessLauncher};
pub use stack::{LauncherPaths, build_config};
