#![forbid(unsafe_code)]

use crate::domain::StatusChange;
use parking_lot::Mutex;
use std::sync::{
    Arc, Weak,
    atomic::{AtomicU64, Ordering},
};
use tracing::trace;

/// Callback invoked after every effective runtime change.
pub type Listener = Arc<dyn Fn(&StatusChange) + Send + Sync>;

#[derive(Default)]
struct ListenerSetInner {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener)>>,
}

/// Registered status listeners.
#[derive(Default, Clone)]
pub(crate) struct ListenerSet(Arc<ListenerSetInner>);

impl ListenerSet {
    pub(crate) fn add(&self, listener: Listener) -> Subscription {
        let id = self.0.next_id.fetch_add(1, Ordering::Relaxed);
        self.0.entries.lock().push((id, listener));
        trace!(id, "listener registered");
        Subscription {
            id,
            set: Arc::downgrade(&self.0),
        }
    }

    /// Call every listener. The entry list is cloned first so listeners may
    /// subscribe or unsubscribe from inside the callback.
    pub(crate) fn notify(&self, change: &StatusChange) {
        let listeners: Vec<Listener> = self
            .0
            .entries
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.0.entries.lock().len()
    }
}

/// Handle returned by `subscribe`. Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    set: Weak<ListenerSetInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(set) = self.set.upgrade() {
            set.entries.lock().retain(|(id, _)| *id != self.id);
            trace!(id = self.id, "listener removed");
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
