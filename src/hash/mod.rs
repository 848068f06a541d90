//! # Hash Module
//!
//! Hash algorithm selection shared by envelope signing and key identifiers.
//!
//! ## Examples
//!
//! ```
//! use chains_attest::hash::{HashAlgorithm, calculate_hash_with_algorithm};
//!
//! let hash = calculate_hash_with_algorithm(b"Hello, World!", &HashAlgorithm::Sha256);
//! assert_eq!(hash.len(), 64);
//! ```

use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calculate the hex-encoded hash of `data` using the specified algorithm
///
/// - SHA-256: 64 characters
/// - SHA-384: 96 characters
/// - SHA-512: 128 characters
pub fn calculate_hash_with_algorithm(data: &[u8], algorithm: &HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        HashAlgorithm::Sha384 => hex::encode(Sha384::digest(data)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
    }
}
