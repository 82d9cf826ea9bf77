//! # Content Digests — Integrity Checksums
//!
//! Defines `ContentDigest` and `DigestAlgorithm` for the checksums carried in
//! the backbone manifest and used to verify a published sequence tree.
//!
//! Two hashing paths exist, on purpose:
//!
//! - **Structured artifacts** (manifests, sequence records) are digested via
//!   [`sha256_digest`], which accepts only [`CanonicalBytes`] — the type
//!   signature guarantees the bytes went through JCS canonicalization first.
//! - **Opaque document binaries** are digested via [`sha256_bytes`]. Document
//!   content is owned by an external repository and must be hashed exactly as
//!   stored, with no canonicalization.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

use crate::canonical::CanonicalBytes;

/// The hash algorithm that produced a content digest.
///
/// SHA-256 is the default. SHA-512 is supported because some transmission
/// gateways mandate it for large submissions; the algorithm tag travels with
/// every digest so a mixed history stays verifiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256 — default content addressing.
    Sha256,
    /// SHA-512 — gateway-mandated variant.
    Sha512,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed to parse a `algorithm:hex` digest string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid content digest {0:?}: expected '<algorithm>:<hex>'")]
pub struct DigestParseError(pub String);

/// A content digest with its algorithm tag, rendered as `sha256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw digest value (32 bytes for SHA-256, 64 for SHA-512).
    pub bytes: Vec<u8>,
}

impl ContentDigest {
    /// Create a content digest from raw bytes and algorithm.
    pub fn new(algorithm: DigestAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest value as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from its `algorithm:hex` rendering.
    pub fn parse(s: &str) -> Result<Self, DigestParseError> {
        let (algo, hex) = s
            .split_once(':')
            .ok_or_else(|| DigestParseError(s.to_string()))?;
        let algorithm = match algo {
            "sha256" => DigestAlgorithm::Sha256,
            "sha512" => DigestAlgorithm::Sha512,
            _ => return Err(DigestParseError(s.to_string())),
        };
        let expected_len = match algorithm {
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
        };
        if hex.len() != expected_len || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DigestParseError(s.to_string()));
        }
        let bytes = hex
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                let s = std::str::from_utf8(pair).map_err(|_| DigestParseError(hex.to_string()))?;
                u8::from_str_radix(s, 16).map_err(|_| DigestParseError(hex.to_string()))
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Ok(Self { algorithm, bytes })
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 digest of canonical bytes.
///
/// Accepts only `&CanonicalBytes` — structured artifacts cannot be digested
/// without passing through the canonicalization pipeline first.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest::new(
        DigestAlgorithm::Sha256,
        Sha256::digest(data.as_bytes()).to_vec(),
    )
}

/// Compute a SHA-256 digest of raw bytes.
///
/// For opaque document binaries only. Structured artifacts go through
/// [`sha256_digest`].
pub fn sha256_bytes(data: &[u8]) -> ContentDigest {
    ContentDigest::new(DigestAlgorithm::Sha256, Sha256::digest(data).to_vec())
}

/// Compute a SHA-512 digest of raw bytes.
pub fn sha512_bytes(data: &[u8]) -> ContentDigest {
    ContentDigest::new(DigestAlgorithm::Sha512, Sha512::digest(data).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_digest_deterministic() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(sha256_digest(&cb), sha256_digest(&cb));
    }

    #[test]
    fn test_known_sha256_vector() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_sha256_bytes_of_known_input() {
        // SHA256("abc") is the classic NIST test vector.
        let digest = sha256_bytes(b"abc");
        assert_eq!(
            digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_display_and_parse_roundtrip() {
        let digest = sha256_bytes(b"abc");
        let rendered = digest.to_string();
        assert!(rendered.starts_with("sha256:"));
        let parsed = ContentDigest::parse(&rendered).unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn test_sha512_roundtrip() {
        let digest = sha512_bytes(b"abc");
        assert_eq!(digest.bytes.len(), 64);
        let parsed = ContentDigest::parse(&digest.to_string()).unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ContentDigest::parse("sha256").is_err());
        assert!(ContentDigest::parse("md5:abcd").is_err());
        assert!(ContentDigest::parse("sha256:zzzz").is_err());
        assert!(ContentDigest::parse("sha256:abcd").is_err()); // wrong width
    }

    #[test]
    fn test_different_inputs_different_digests() {
        assert_ne!(sha256_bytes(b"a"), sha256_bytes(b"b"));
    }
}
