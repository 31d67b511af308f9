use std::sync::Arc;

use hashlog_types::{Entry, EntryIndex, Triple, WriterId};

use crate::error::RegistryResult;
use crate::event::{EntryObserver, EntryStream, EventFilter};
use crate::log::{EntryLog, RegistryCore};
use crate::traits::{EntryEvents, RegistryReader, RegistryWriter};
use crate::validation::{ConsistencyReport, RegistryVerifier};

/// In-memory registry for tests, local demos, and embedding.
pub struct InMemoryRegistry {
    core: RegistryCore,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Registry whose subscriber channels hold `channel_capacity` events.
    pub fn with_capacity(channel_capacity: usize) -> Self {
        Self {
            core: RegistryCore::new(EntryLog::new(), channel_capacity),
        }
    }

    /// Check count, index sequence, and stored triples.
    pub fn verify(&self) -> ConsistencyReport {
        let log = self.core.read();
        RegistryVerifier::verify_log(&log)
    }

    pub fn subscriber_count(&self) -> usize {
        self.core.notifier().subscriber_count()
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryWriter for InMemoryRegistry {
    fn append(&self, triple: Triple, writer: WriterId) -> RegistryResult<EntryIndex> {
        self.core.commit(None, triple, writer, |_| Ok(()))
    }

    fn set_entry(
        &self,
        index: EntryIndex,
        triple: Triple,
        writer: WriterId,
    ) -> RegistryResult<()> {
        self.core
            .commit(Some(index), triple, writer, |_| Ok(()))
            .map(|_| ())
    }
}

impl RegistryReader for InMemoryRegistry {
    fn get(&self, index: EntryIndex) -> RegistryResult<Entry> {
        self.core.get(index)
    }

    fn count(&self) -> u64 {
        self.core.read().len()
    }

    fn read_range(&self, from: u64, to: u64) -> RegistryResult<Vec<Entry>> {
        self.core.read_range(from, to)
    }
}

impl EntryEvents for InMemoryRegistry {
    fn subscribe(&self, filter: EventFilter) -> EntryStream {
        self.core.notifier().subscribe(filter)
    }

    fn observe(&self, observer: Arc<dyn EntryObserver>) {
        self.core.notifier().observe(observer);
    }
}
