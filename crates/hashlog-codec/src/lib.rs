//! Multihash codec for hashlog.
//!
//! Converts the textual, base58-rendered multihash
//! (`[code varint][length varint][digest]`) into the fixed-width
//! [`Triple`](hashlog_types::Triple) stored by the registry, and back. The
//! codec only repackages bytes; it never recomputes or checks the digest.

pub mod error;
pub mod multihash;

pub use error::{CodecError, CodecResult};
pub use multihash::MultihashCodec;
