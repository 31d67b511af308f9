use std::sync::{Arc, PoisonError, RwLock};

use hashlog_types::{Entry, EntryIndex, Triple, WriterId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Notification emitted once per successful registry write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySet {
    pub index: EntryIndex,
    pub triple: Triple,
    pub writer: WriterId,
}

impl From<&Entry> for EntrySet {
    fn from(entry: &Entry) -> Self {
        Self {
            index: entry.index,
            triple: entry.triple,
            writer: entry.writer,
        }
    }
}

/// Synchronous observer of registry writes.
///
/// Called in commit order after the entry is readable. Reads (`get_entry`,
/// `count`, `read_range`) are allowed from inside the callback; writes are
/// not, since the committing writer still holds its turn.
pub trait EntryObserver: Send + Sync {
    fn on_entry_set(&self, event: &EntrySet);
}

/// Filter for subscribing to a subset of entry notifications.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    /// If set, only entries written by these writers are delivered.
    pub writers: Option<Vec<WriterId>>,
    /// If set, only entries at or after this index are delivered.
    pub from_index: Option<EntryIndex>,
}

impl EventFilter {
    /// Returns `true` if the given event matches this filter.
    pub fn matches(&self, event: &EntrySet) -> bool {
        if let Some(ref writers) = self.writers {
            if !writers.contains(&event.writer) {
                return false;
            }
        }
        if let Some(from) = self.from_index {
            if event.index < from {
                return false;
            }
        }
        true
    }
}

/// A broadcast channel receiver for entry notifications.
pub type EntryStream = broadcast::Receiver<EntrySet>;

struct Subscriber {
    filter: EventFilter,
    sender: broadcast::Sender<EntrySet>,
}

/// Fan-out of `EntrySet` notifications to subscribers and observers.
pub(crate) struct EntryNotifier {
    subscribers: RwLock<Vec<Subscriber>>,
    observers: RwLock<Vec<Arc<dyn EntryObserver>>>,
    capacity: usize,
}

impl EntryNotifier {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            observers: RwLock::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn subscribe(&self, filter: EventFilter) -> EntryStream {
        let (sender, rx) = broadcast::channel(self.capacity);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber { filter, sender });
        rx
    }

    pub(crate) fn observe(&self, observer: Arc<dyn EntryObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Deliver an event to every observer and matching subscriber.
    /// Subscribers whose receivers are all dropped are pruned.
    pub(crate) fn publish(&self, event: &EntrySet) {
        for observer in self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            observer.on_entry_set(event);
        }

        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        subs.retain(|sub| {
            if sub.filter.matches(event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                sub.sender.receiver_count() > 0
            }
        });
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
