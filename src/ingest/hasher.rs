//! Content fingerprinting
//!
//! Equal payloads always map to the same fingerprint, so the fingerprint
//! column in the file index is the deduplication key.

use sha2::{Digest, Sha256};

/// Compute the hex-encoded SHA-256 fingerprint of a payload.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint(b"hello1234");
        let b = fingerprint(b"hello1234");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_is_fixed_length_hex() {
        let hash = fingerprint(b"anything");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn single_bit_change_alters_fingerprint() {
        let original = b"hello1234".to_vec();
        let mut flipped = original.clone();
        flipped[0] ^= 0x01;
        assert_ne!(fingerprint(&original), fingerprint(&flipped));
    }

    #[test]
    fn empty_payload_has_known_digest() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
