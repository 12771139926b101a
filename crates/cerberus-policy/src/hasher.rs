//! Identity hashing for subscription-ownership comparison.

use sha1::{Digest, Sha1};

/// Maps an identity string to its canonical hashed form.
///
/// Subscription ids embed the hash of their owner's consumer identity;
/// ownership checks compare against this function's output.
pub trait IdentityHasher: Send + Sync {
    /// The canonical hash of one identity.
    fn hash(&self, identity: &str) -> String;
}

/// Lowercase-hex SHA-1 of the identity's UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha1IdentityHasher;

impl IdentityHasher for Sha1IdentityHasher {
    fn hash(&self, identity: &str) -> String {
        let digest = Sha1::digest(identity.as_bytes());
        digest.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        let hasher = Sha1IdentityHasher;
        assert_eq!(hasher.hash("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(hasher.hash(""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn test_output_is_lowercase_hex() {
        let hash = Sha1IdentityHasher.hash("alice@example.org");
        assert_eq!(hash.len(), 40);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
