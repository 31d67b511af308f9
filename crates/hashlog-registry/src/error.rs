use std::io;

use hashlog_types::EntryIndex;

/// Errors produced by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Read of a slot that has never been written.
    #[error("entry {index} not found (registry holds {count} entries)")]
    IndexNotFound { index: EntryIndex, count: u64 },

    /// Write to any index other than the next free one.
    #[error("index {index} violates sequential policy: next free index is {next}")]
    IndexOutOfPolicy { index: EntryIndex, next: EntryIndex },

    /// The caller did not present a usable identity.
    #[error("writer must be identifiable")]
    UnidentifiedWriter,

    /// The all-zero triple is reserved for "no entry".
    #[error("sentinel triple cannot be stored")]
    SentinelTriple,

    /// Declared size does not fit the digest block.
    #[error("triple size {size} exceeds the {capacity}-byte digest block")]
    OversizedTriple { size: u8, capacity: usize },

    #[error("invalid range: from={from}, to={to}, count={count}")]
    InvalidRange { from: u64, to: u64, count: u64 },

    /// Persisted records disagree with the registry invariants.
    #[error("integrity violation at offset {offset}: {reason}")]
    IntegrityViolation { offset: u64, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the registry crate.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
