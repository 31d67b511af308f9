//! Foundation types for hashlog.
//!
//! Every other hashlog crate depends on `hashlog-types`.
//!
//! # Key Types
//!
//! - [`Triple`] — Fixed-width representation of a multihash (digest, code, size)
//! - [`EntryIndex`] — Sequential slot number in the registry
//! - [`Entry`] — A stored triple together with its index and writer
//! - [`WriterId`] — Identity of the caller that wrote an entry

pub mod entry;
pub mod error;
pub mod identity;
pub mod triple;

pub use entry::{Entry, EntryIndex};
pub use error::TypeError;
pub use identity::{IdentityMaterial, WriterId};
pub use triple::{Triple, DIGEST_CAPACITY, MAX_DIGEST_LENGTH, MAX_FUNCTION_CODE};
