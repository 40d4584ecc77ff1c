//! Core types shared across the staging tree, object store and commit chain.

/// Hash: 256-bit BLAKE3 digest identifying a blob, tree or commit
pub type Hash = [u8; 32];

/// Name of the digest algorithm. Fixed for the lifetime of a repository.
pub const HASH_ALGORITHM: &str = "blake3";

/// Render a hash as lowercase hex
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Parse a 64-character hex string into a hash
pub fn hash_from_hex(value: &str) -> Option<Hash> {
    let bytes = hex::decode(value.trim()).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    Some(hash)
}

/// Serde adapters for hex-encoded hashes in human-readable records
pub(crate) mod hex_hash {
    use super::{hash_from_hex, hash_to_hex, Hash};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hash_to_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let value = String::deserialize(deserializer)?;
        hash_from_hex(&value).ok_or_else(|| D::Error::custom(format!("invalid hash: {}", value)))
    }

    pub mod option {
        use super::{hash_from_hex, hash_to_hex, Hash};
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            hash: &Option<Hash>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match hash {
                Some(hash) => serializer.serialize_some(&hash_to_hex(hash)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Hash>, D::Error> {
            let value = Option::<String>::deserialize(deserializer)?;
            value
                .map(|v| {
                    hash_from_hex(&v).ok_or_else(|| D::Error::custom(format!("invalid hash: {}", v)))
                })
                .transpose()
        }
    }
}
