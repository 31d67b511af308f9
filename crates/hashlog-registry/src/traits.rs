use std::sync::Arc;

use hashlog_types::{Entry, EntryIndex, Triple, WriterId};

use crate::error::RegistryResult;
use crate::event::{EntryObserver, EntryStream, EventFilter};

/// Write boundary for registry operations.
///
/// There is no update or delete: every slot goes from unset to
/// set exactly once.
pub trait RegistryWriter: Send + Sync {
    /// Store `triple` at the next free index and return that index.
    ///
    /// Concurrent callers never receive the same index.
    fn append(&self, triple: Triple, writer: WriterId) -> RegistryResult<EntryIndex>;

    /// Store `triple` at a caller-chosen index.
    ///
    /// Succeeds only when `index` equals the next free index; anything else
    /// fails with `IndexOutOfPolicy` and leaves the registry untouched.
    fn set_entry(&self, index: EntryIndex, triple: Triple, writer: WriterId)
        -> RegistryResult<()>;
}

/// Read boundary for registry queries.
pub trait RegistryReader: Send + Sync {
    /// Full entry (triple and writer) at `index`.
    fn get(&self, index: EntryIndex) -> RegistryResult<Entry>;

    /// Number of populated slots, which is also the next free index.
    fn count(&self) -> u64;

    /// Entries in the half-open range `[from, to)`.
    fn read_range(&self, from: u64, to: u64) -> RegistryResult<Vec<Entry>>;

    /// Triple stored at `index`, or `IndexNotFound`.
    fn get_entry(&self, index: EntryIndex) -> RegistryResult<Triple> {
        self.get(index).map(|entry| entry.triple)
    }

    /// Every stored entry, in index order.
    fn entries(&self) -> RegistryResult<Vec<Entry>> {
        self.read_range(0, self.count())
    }
}

/// Notification boundary: every successful write emits one `EntrySet`.
pub trait EntryEvents {
    /// Subscribe to entries matching `filter`.
    fn subscribe(&self, filter: EventFilter) -> EntryStream;

    /// Register an observer called synchronously after each write.
    fn observe(&self, observer: Arc<dyn EntryObserver>);
}
