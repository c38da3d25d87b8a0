//! BLAKE3 content fingerprints used as verdict-cache keys.

use crate::reviewer::ReviewKind;

/// 32-byte BLAKE3 digest of reviewed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding (64 chars).
    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[inline]
pub fn fingerprint_bytes(data: &[u8]) -> Fingerprint {
    Fingerprint(*blake3::hash(data).as_bytes())
}

#[inline]
pub fn fingerprint_text(text: &str) -> Fingerprint {
    fingerprint_bytes(text.as_bytes())
}

/// Cache key: `"{fingerprint}:{kind}"`.
pub fn cache_key(fingerprint: &Fingerprint, kind: ReviewKind) -> String {
    format!("{}:{}", fingerprint, kind.as_tag())
}
