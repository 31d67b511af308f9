/// Errors produced by the multihash codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Bad base58, bad varint framing, or a length mismatch.
    #[error("malformed multihash: {0}")]
    MalformedInput(String),

    /// The digest does not fit in the fixed digest block.
    #[error("digest of {size} bytes exceeds the {capacity}-byte digest block")]
    DigestTooLarge { size: usize, capacity: usize },

    /// The triple cannot be turned back into a multihash.
    #[error("invalid triple: {0}")]
    InvalidTriple(String),
}

/// Convenience alias used throughout the codec crate.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
