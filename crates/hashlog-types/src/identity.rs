use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Material used to derive a [`WriterId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityMaterial {
    /// A 32-byte public key supplied by the session layer.
    PublicKey([u8; 32]),
    /// An account name or address string.
    Account(String),
}

/// Identity of the caller performing a registry write.
///
/// A `WriterId` is derived deterministically from [`IdentityMaterial`]
/// using BLAKE3. The all-zero id is reserved as "anonymous" and is refused
/// by every write path.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WriterId {
    hash: [u8; 32],
}

impl WriterId {
    /// The reserved anonymous identity.
    pub const ANONYMOUS: Self = Self { hash: [0; 32] };

    /// Derive a `WriterId` from identity material.
    pub fn derive(material: &IdentityMaterial) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"hashlog-writer-v1:");
        match material {
            IdentityMaterial::PublicKey(pk) => {
                hasher.update(b"pubkey:");
                hasher.update(pk);
            }
            IdentityMaterial::Account(name) => {
                hasher.update(b"account:");
                hasher.update(name.as_bytes());
            }
        }
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Shorthand for `derive(&IdentityMaterial::Account(name))`.
    pub fn account(name: &str) -> Self {
        Self::derive(&IdentityMaterial::Account(name.to_string()))
    }

    pub fn is_anonymous(&self) -> bool {
        self.hash == [0; 32]
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("w:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters, optional `w:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("w:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let hash: [u8; 32] = bytes.as_slice().try_into().map_err(|_| TypeError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self { hash })
    }

    /// Create from a raw 32-byte hash. Use `derive()` for production code.
    pub fn from_raw(hash: [u8; 32]) -> Self {
        Self { hash }
    }
}

impl fmt::Debug for WriterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WriterId({})", self.short_id())
    }
}

impl fmt::Display for WriterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(WriterId::account("alice"), WriterId::account("alice"));
    }

    #[test]
    fn different_material_produces_different_ids() {
        assert_ne!(WriterId::account("alice"), WriterId::account("bob"));
        let bytes = [7u8; 32];
        let pk = WriterId::derive(&IdentityMaterial::PublicKey(bytes));
        assert_ne!(pk, WriterId::from_raw(bytes));
    }

    #[test]
    fn derived_ids_are_never_anonymous() {
        assert!(!WriterId::account("").is_anonymous());
        assert!(WriterId::ANONYMOUS.is_anonymous());
    }

    #[test]
    fn hex_roundtrip_with_prefix() {
        let id = WriterId::account("carol");
        let prefixed = format!("w:{}", id.to_hex());
        assert_eq!(WriterId::from_hex(&prefixed).unwrap(), id);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert_eq!(
            WriterId::from_hex("abcd"),
            Err(TypeError::InvalidLength {
                expected: 32,
                actual: 2
            })
        );
        assert!(matches!(WriterId::from_hex("zz"), Err(TypeError::InvalidHex(_))));
    }

    #[test]
    fn short_id_format() {
        let short = WriterId::account("dave").short_id();
        assert!(short.starts_with("w:"));
        assert_eq!(short.len(), 10);
    }
}
