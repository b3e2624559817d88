//! Privacy hashing for report identifiers
//!
//! Plugin names and file names are hashed before they reach the legacy
//! encoding so that unreleased or experimental plugins cannot be identified
//! from a report. The hash is stable and one-way: the first 8 bytes of the
//! SHA-256 digest, exposed both as standard Base64 text and as a big-endian
//! integer.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// Hash of a name in both of its wire forms
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameHash {
    /// Base64 text of the truncated digest
    pub base64: String,
    /// The truncated digest read as a big-endian integer
    pub numeric: u64,
}

/// Hash `value` into its Base64 and numeric forms.
pub fn create_hashes(value: &str) -> NameHash {
    let digest = Sha256::digest(value.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);

    NameHash {
        base64: STANDARD.encode(prefix),
        numeric: u64::from_be_bytes(prefix),
    }
}

/// Base64 hash of `value`, the form written to the legacy encoding.
pub fn hash_name(value: &str) -> String {
    create_hashes(value).base64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(create_hashes("Shockwave Flash"), create_hashes("Shockwave Flash"));
    }

    #[test]
    fn test_distinct_names_hash_differently() {
        let corpus = [
            "Shockwave Flash",
            "Java(TM) Platform SE 7",
            "Chrome PDF Viewer",
            "QuickTime Plug-in 7.7",
            "Silverlight Plug-In",
            "libflashplayer.so",
            "",
        ];
        let hashes: std::collections::HashSet<_> =
            corpus.iter().map(|name| hash_name(name)).collect();
        assert_eq!(hashes.len(), corpus.len());
    }

    #[test]
    fn test_hash_does_not_leak_the_name() {
        let hash = hash_name("Secret Prototype Plugin");
        assert!(!hash.contains("Secret"));
        // 8 bytes encode to 12 Base64 characters with one pad
        assert_eq!(hash.len(), 12);
        assert!(hash.ends_with('='));
    }

    #[test]
    fn test_numeric_matches_base64_bytes() {
        let hashes = create_hashes("Flash");
        let bytes = STANDARD.decode(&hashes.base64).unwrap();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&bytes);
        assert_eq!(u64::from_be_bytes(prefix), hashes.numeric);
    }
}
