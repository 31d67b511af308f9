use std::fmt;

use serde::{Deserialize, Serialize};

/// Width of the fixed digest block, in bytes.
pub const DIGEST_CAPACITY: usize = 32;

/// Largest hash-function code a triple can carry (one byte).
pub const MAX_FUNCTION_CODE: u64 = u8::MAX as u64;

/// Largest declared digest length a triple can carry (one byte).
pub const MAX_DIGEST_LENGTH: u64 = u8::MAX as u64;

/// Fixed-width storage form of a multihash.
///
/// The first `size` bytes of `digest` hold the real digest; the rest of the
/// block is zero padding and carries no meaning. The all-zero triple is the
/// sentinel for "no entry" and is never stored.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Digest bytes, right-padded with zeros.
    pub digest: [u8; DIGEST_CAPACITY],
    /// Multihash function code (e.g. `0x12` for SHA2-256).
    pub hash_function: u8,
    /// True digest length in bytes.
    pub size: u8,
}

impl Triple {
    /// The all-zero "unset" triple.
    pub const SENTINEL: Self = Self {
        digest: [0; DIGEST_CAPACITY],
        hash_function: 0,
        size: 0,
    };

    pub const fn new(digest: [u8; DIGEST_CAPACITY], hash_function: u8, size: u8) -> Self {
        Self {
            digest,
            hash_function,
            size,
        }
    }

    /// Returns `true` for the zero-function, zero-size sentinel.
    ///
    /// Padding is ignored: only `hash_function` and `size` decide.
    pub fn is_sentinel(&self) -> bool {
        self.hash_function == 0 && self.size == 0
    }

    /// The meaningful prefix of the digest block.
    ///
    /// Returns `None` when `size` exceeds [`DIGEST_CAPACITY`].
    pub fn digest_bytes(&self) -> Option<&[u8]> {
        self.digest.get(..self.size as usize)
    }
}

impl Default for Triple {
    fn default() -> Self {
        Self::SENTINEL
    }
}

impl fmt::Debug for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Triple({self})")
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.digest_bytes().unwrap_or(&self.digest);
        write!(
            f,
            "0x{:02x}/{}:{}",
            self.hash_function,
            self.size,
            hex::encode(&shown[..shown.len().min(4)])
        )
    }
}
