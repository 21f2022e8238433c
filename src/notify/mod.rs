//! Configuration change notification.
//!
//! Subscribers are told about every reload. With the `file-watch` feature,
//! [`ConfigWatcher`] turns file-system events into debounced reload signals.

pub mod subscriber;

#[cfg(feature = "file-watch")]
pub mod watcher;

pub use subscriber::{SubscriberRegistry, SubscriptionHandle};

#[cfg(feature = "file-watch")]
pub use watcher::ConfigWatcher;
