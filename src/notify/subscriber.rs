//! Callbacks fired after a source has been reloaded.

use crate::core::SourceId;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

type Callback = Arc<dyn Fn(SourceId) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    entries: Vec<(usize, Callback)>,
    next_id: usize,
}

/// Handle for a subscription; dropping it unsubscribes.
pub struct SubscriptionHandle {
    id: usize,
    registry: Weak<RwLock<Subscribers>>,
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.write().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Registry of reload callbacks.
///
/// Callbacks receive the id of the source that was reloaded and run on the
/// thread that performed the reload, in subscription order.
///
/// # Examples
///
/// ```rust
/// use halflife_launcher::notify::SubscriberRegistry;
///
/// let registry = SubscriberRegistry::new();
/// let handle = registry.subscribe(|source| println!("{source} reloaded"));
/// assert_eq!(registry.subscriber_count(), 1);
///
/// drop(handle);
/// assert_eq!(registry.subscriber_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    inner: Arc<RwLock<Subscribers>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(SourceId) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, Arc::new(callback)));

        SubscriptionHandle {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every callback for a reloaded source.
    ///
    /// The registry lock is released before callbacks run, so a callback may
    /// subscribe or drop handles itself.
    pub fn notify_all(&self, source: SourceId) {
        let callbacks: Vec<Callback> = self
            .inner
            .read()
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(source);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().entries.len()
    }
}
