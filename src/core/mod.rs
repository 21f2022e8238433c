//! Core configuration types: keys, snapshots and the layered provider.

mod builder;
mod key;
mod provider;
mod snapshot;

pub use builder::LayeredConfigBuilder;
pub use key::ConfigKey;
pub use provider::{LayeredConfig, SourceId};
pub use snapshot::Snapshot;

#[cfg(feature = "file-watch")]
pub use provider::WatchHandle;
