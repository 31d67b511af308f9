//! High-level SDK for hashlog.
//!
//! Joins the multihash codec to a registry backend: callers hand in
//! multihash text and get an index back, or hand in an index and get the
//! exact original text back.

pub mod error;
pub mod hashlog;

pub use error::{SdkError, SdkResult};
pub use hashlog::{HashLog, ResolvedEntry};

// Re-export key types
pub use hashlog_codec::{CodecError, MultihashCodec};
pub use hashlog_registry::{
    ConsistencyReport, DurableRegistry, EntryEvents, EntryObserver, EntrySet, EntryStream,
    EventFilter, InMemoryRegistry, RegistryConfig, RegistryError, RegistryReader, RegistryWriter,
    SyncMode,
};
pub use hashlog_types::{Entry, EntryIndex, IdentityMaterial, Triple, WriterId};
