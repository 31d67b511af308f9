use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::WriterId;
use crate::triple::Triple;

/// Sequential slot number in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryIndex(pub u64);

impl EntryIndex {
    /// The index following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for EntryIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A populated registry slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub index: EntryIndex,
    pub triple: Triple,
    /// Caller that wrote the slot.
    pub writer: WriterId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_ordering_and_next() {
        let a = EntryIndex(3);
        assert_eq!(a.next(), EntryIndex(4));
        assert!(a < a.next());
        assert_eq!(EntryIndex::from(3), a);
    }

    #[test]
    fn index_display() {
        assert_eq!(EntryIndex(12).to_string(), "#12");
    }
}
