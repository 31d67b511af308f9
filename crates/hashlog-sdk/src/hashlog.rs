use std::sync::Arc;

use hashlog_codec::MultihashCodec;
use hashlog_registry::{
    DurableRegistry, EntryEvents, EntryObserver, EntryStream, EventFilter, InMemoryRegistry,
    RegistryConfig, RegistryReader, RegistryWriter,
};
use hashlog_types::{Entry, EntryIndex, Triple, WriterId};
use serde::Serialize;
use tracing::debug;

use crate::error::SdkResult;

/// A registry entry with its multihash text restored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    pub index: EntryIndex,
    pub multihash: String,
    pub writer: WriterId,
}

/// Multihash registry: codec in front of a registry backend.
pub struct HashLog<R> {
    registry: R,
}

impl HashLog<InMemoryRegistry> {
    pub fn in_memory() -> Self {
        Self::new(InMemoryRegistry::new())
    }
}

impl HashLog<DurableRegistry> {
    /// Open a file-backed registry.
    pub fn open(config: &RegistryConfig) -> SdkResult<Self> {
        Ok(Self::new(DurableRegistry::open(config)?))
    }
}

impl<R> HashLog<R>
where
    R: RegistryReader + RegistryWriter,
{
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Encode `multihash` and append it at the next free index.
    pub fn register(&self, multihash: &str, writer: WriterId) -> SdkResult<EntryIndex> {
        let triple = MultihashCodec::encode(multihash)?;
        let index = self.registry.append(triple, writer)?;
        debug!(%index, multihash, "registered");
        Ok(index)
    }

    /// Encode `multihash` and write it at a pre-assigned `index`.
    pub fn register_at(
        &self,
        index: EntryIndex,
        multihash: &str,
        writer: WriterId,
    ) -> SdkResult<()> {
        let triple = MultihashCodec::encode(multihash)?;
        self.registry.set_entry(index, triple, writer)?;
        Ok(())
    }

    /// The exact multihash text stored at `index`.
    pub fn resolve(&self, index: EntryIndex) -> SdkResult<String> {
        let triple = self.registry.get_entry(index)?;
        Ok(MultihashCodec::decode(&triple)?)
    }

    pub fn triple(&self, index: EntryIndex) -> SdkResult<Triple> {
        Ok(self.registry.get_entry(index)?)
    }

    pub fn count(&self) -> u64 {
        self.registry.count()
    }

    /// Every entry in index order, decoded.
    pub fn list(&self) -> SdkResult<Vec<ResolvedEntry>> {
        self.registry
            .entries()?
            .iter()
            .map(resolve_entry)
            .collect()
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }
}

impl<R> HashLog<R>
where
    R: EntryEvents,
{
    pub fn subscribe(&self, filter: EventFilter) -> EntryStream {
        self.registry.subscribe(filter)
    }

    pub fn observe(&self, observer: Arc<dyn EntryObserver>) {
        self.registry.observe(observer);
    }
}

fn resolve_entry(entry: &Entry) -> SdkResult<ResolvedEntry> {
    Ok(ResolvedEntry {
        index: entry.index,
        multihash: MultihashCodec::decode(&entry.triple)?,
        writer: entry.writer,
    })
}
