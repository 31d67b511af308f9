use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard};

use hashlog_types::{Entry, EntryIndex, Triple, WriterId, DIGEST_CAPACITY};
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::event::{EntryNotifier, EntrySet};

/// Write-once-per-slot sequence of entries.
///
/// The only mutation is [`EntryLog::push`] at the next free index; an
/// entry's position is its index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryLog {
    entries: Vec<Entry>,
}

impl EntryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of populated slots.
    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The index the next push must carry.
    pub fn next_index(&self) -> EntryIndex {
        EntryIndex(self.len())
    }

    pub fn get(&self, index: EntryIndex) -> Option<&Entry> {
        usize::try_from(index.0)
            .ok()
            .and_then(|position| self.entries.get(position))
    }

    /// Entries in `[from, to)`, or `None` if the range is out of bounds.
    pub fn range(&self, from: u64, to: u64) -> Option<&[Entry]> {
        if from > to || to > self.len() {
            return None;
        }
        self.entries.get(from as usize..to as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Append an entry; its index must equal [`EntryLog::next_index`].
    pub fn push(&mut self, entry: Entry) -> RegistryResult<()> {
        let next = self.next_index();
        if entry.index != next {
            return Err(RegistryError::IndexOutOfPolicy {
                index: entry.index,
                next,
            });
        }
        self.entries.push(entry);
        Ok(())
    }
}

/// Shared write path for every registry backend.
///
/// Writers take `turn` for the whole commit, so no two writers can claim the
/// same index and notifications leave in commit order. The log write lock is
/// held only for index assignment, persistence and the push; it is released
/// before observers run, so observers may read the registry.
pub(crate) struct RegistryCore {
    turn: Mutex<()>,
    log: RwLock<EntryLog>,
    notifier: EntryNotifier,
}

impl RegistryCore {
    pub(crate) fn new(log: EntryLog, channel_capacity: usize) -> Self {
        Self {
            turn: Mutex::new(()),
            log: RwLock::new(log),
            notifier: EntryNotifier::new(channel_capacity),
        }
    }

    /// Commit a write at `target` (or the next free index when `None`).
    ///
    /// `persist` runs before the entry becomes visible; if it fails nothing
    /// is published and the count does not move.
    pub(crate) fn commit<F>(
        &self,
        target: Option<EntryIndex>,
        triple: Triple,
        writer: WriterId,
        persist: F,
    ) -> RegistryResult<EntryIndex>
    where
        F: FnOnce(&Entry) -> RegistryResult<()>,
    {
        check_write(&triple, &writer)?;

        let _turn = self.turn.lock().unwrap_or_else(PoisonError::into_inner);
        let event = {
            let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
            let next = log.next_index();
            if let Some(index) = target {
                if index != next {
                    return Err(RegistryError::IndexOutOfPolicy { index, next });
                }
            }

            let entry = Entry {
                index: next,
                triple,
                writer,
            };
            persist(&entry)?;
            let event = EntrySet::from(&entry);
            log.push(entry)?;
            event
        };
        let next = event.index;
        self.notifier.publish(&event);

        debug!(index = next.0, triple = %triple, writer = %writer, "entry set");
        Ok(next)
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, EntryLog> {
        self.log.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn notifier(&self) -> &EntryNotifier {
        &self.notifier
    }

    pub(crate) fn get(&self, index: EntryIndex) -> RegistryResult<Entry> {
        let log = self.read();
        log.get(index)
            .cloned()
            .ok_or(RegistryError::IndexNotFound {
                index,
                count: log.len(),
            })
    }

    pub(crate) fn read_range(&self, from: u64, to: u64) -> RegistryResult<Vec<Entry>> {
        let log = self.read();
        log.range(from, to)
            .map(<[Entry]>::to_vec)
            .ok_or(RegistryError::InvalidRange {
                from,
                to,
                count: log.len(),
            })
    }
}

fn check_write(triple: &Triple, writer: &WriterId) -> RegistryResult<()> {
    if writer.is_anonymous() {
        return Err(RegistryError::UnidentifiedWriter);
    }
    if triple.is_sentinel() {
        return Err(RegistryError::SentinelTriple);
    }
    if triple.size as usize > DIGEST_CAPACITY {
        return Err(RegistryError::OversizedTriple {
            size: triple.size,
            capacity: DIGEST_CAPACITY,
        });
    }
    Ok(())
}
