//! Append-only entry registry for hashlog.
//!
//! This crate provides:
//! - `RegistryWriter` / `RegistryReader` trait boundaries
//! - `EntryLog`, the write-once-per-slot sequence behind every registry
//! - `InMemoryRegistry` for tests and embedding
//! - `DurableRegistry`, backed by a CRC-framed record log
//! - `EntrySet` notifications via observers and broadcast subscriptions
//! - Consistency verification (count, index sequence, triple validity)
//!
//! Indices are strictly sequential: a write succeeds only at the next free
//! index, so `count()` is both the number of stored entries and the next
//! index to be assigned.

pub mod config;
pub mod durable;
pub mod error;
pub mod event;
pub mod log;
pub mod memory;
pub mod record_log;
pub mod traits;
pub mod validation;

pub use config::{RegistryConfig, SyncMode};
pub use durable::DurableRegistry;
pub use error::{RegistryError, RegistryResult};
pub use event::{EntryObserver, EntrySet, EntryStream, EventFilter};
pub use log::EntryLog;
pub use memory::InMemoryRegistry;
pub use record_log::RecordLog;
pub use traits::{EntryEvents, RegistryReader, RegistryWriter};
pub use validation::{ConsistencyReport, RegistryVerifier, Violation, ViolationKind};
