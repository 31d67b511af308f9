use std::path::Path;
use std::sync::Arc;

use hashlog_types::{Entry, EntryIndex, Triple, WriterId};
use tracing::info;

use crate::config::RegistryConfig;
use crate::error::RegistryResult;
use crate::event::{EntryObserver, EntryStream, EventFilter};
use crate::log::{EntryLog, RegistryCore};
use crate::record_log::RecordLog;
use crate::traits::{EntryEvents, RegistryReader, RegistryWriter};
use crate::validation::{ConsistencyReport, RegistryVerifier};

/// Registry persisted to a [`RecordLog`].
///
/// Every write reaches the record log before it becomes visible to readers
/// or subscribers. On open the log is replayed; a damaged tail record is cut
/// away, any other damage refuses to open.
pub struct DurableRegistry {
    core: RegistryCore,
    records: RecordLog,
}

impl DurableRegistry {
    /// Open (or create) the registry described by `config`.
    pub fn open(config: &RegistryConfig) -> RegistryResult<Self> {
        let records = RecordLog::open(&config.path, config.sync_mode)?;

        let mut log = EntryLog::new();
        for entry in records.recover()? {
            log.push(entry)?;
        }

        info!(
            path = %config.path.display(),
            entries = log.len(),
            "registry opened"
        );

        Ok(Self {
            core: RegistryCore::new(log, config.channel_capacity),
            records,
        })
    }

    /// Open with default settings at `path`.
    pub fn open_path(path: &Path) -> RegistryResult<Self> {
        Self::open(&RegistryConfig::at(path))
    }

    /// Re-read the record log from disk and check it against memory.
    pub fn verify(&self) -> RegistryResult<ConsistencyReport> {
        let count = self.core.read().len();
        let scan = RecordLog::scan(self.records.path())?;
        Ok(RegistryVerifier::verify_entries(count, &scan.entries))
    }

    pub fn path(&self) -> &Path {
        self.records.path()
    }

    pub fn subscriber_count(&self) -> usize {
        self.core.notifier().subscriber_count()
    }
}

impl RegistryWriter for DurableRegistry {
    fn append(&self, triple: Triple, writer: WriterId) -> RegistryResult<EntryIndex> {
        self.core.commit(None, triple, writer, |entry| {
            self.records.append(entry).map(|_| ())
        })
    }

    fn set_entry(
        &self,
        index: EntryIndex,
        triple: Triple,
        writer: WriterId,
    ) -> RegistryResult<()> {
        self.core
            .commit(Some(index), triple, writer, |entry| {
                self.records.append(entry).map(|_| ())
            })
            .map(|_| ())
    }
}

impl RegistryReader for DurableRegistry {
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

impl EntryEvents for DurableRegistry {
    fn subscribe(&self, filter: EventFilter) -> EntryStream {
        self.core.notifier().subscribe(filter)
    }

    fn observe(&self, observer: Arc<dyn EntryObserver>) {
        self.core.notifier().observe(observer);
    }
}
