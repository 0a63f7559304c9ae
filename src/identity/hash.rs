//! Content-addressed identifiers.

use sha2::{Digest, Sha256};

use crate::graph::Iri;

use super::{kind_tag, Attributes, IdentifierStrategy};

/// Digest width in bytes (128 bits).
const DIGEST_BYTES: usize = 16;

/// Terminates each value in the digest input (ASCII unit separator).
const UNIT_SEPARATOR: u8 = 0x1f;

/// Mints `{namespace}{tag}-{digest}` where the digest is a truncated SHA-256
/// of the identifying values in attribute-name order, each terminated by
/// a unit separator.
#[derive(Debug, Clone)]
pub struct HashIdentifierStrategy {
    namespace: String,
}

impl HashIdentifierStrategy {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Hex digest of the identifying values of `attrs`.
    pub fn digest(attrs: &Attributes) -> String {
        let mut hasher = Sha256::new();
        for value in attrs.identity_values() {
            hasher.update(value.as_bytes());
            hasher.update([UNIT_SEPARATOR]);
        }
        let digest = hasher.finalize();
        hex::encode(&digest[..DIGEST_BYTES])
    }
}

impl IdentifierStrategy for HashIdentifierStrategy {
    fn identifier_for(&self, kind: &str, attrs: &Attributes, general_kind: Option<&str>) -> Iri {
        let tag = kind_tag(general_kind.unwrap_or(kind));
        Iri::new(format!("{}{tag}-{}", self.namespace, Self::digest(attrs)))
    }
}
