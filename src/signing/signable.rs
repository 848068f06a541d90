//! # Signable Trait
//!
//! Common interface for structures that carry their own signatures, such as
//! the DSSE envelope a provenance statement is wrapped in.
//!
//! ## Examples
//!
//! ```no_run
//! use chains_attest::hash::HashAlgorithm;
//! use chains_attest::in_toto::dsse::Envelope;
//! use chains_attest::signing::signable::Signable;
//! use std::path::PathBuf;
//!
//! let mut envelope = Envelope::new(b"{}", "application/vnd.in-toto+json".to_string());
//! envelope
//!     .sign(PathBuf::from("private_key.pem"), HashAlgorithm::Sha256)
//!     .unwrap();
//! assert!(envelope.validate());
//! ```

use crate::error::Result;
use crate::hash::HashAlgorithm;

use std::path::PathBuf;

/// A type that can be signed with a PEM private key.
///
/// Implementations load the key, prepare the bytes to sign, and attach the
/// resulting signature to `self`. Key loading failures surface as
/// [`crate::Error::Io`] or [`crate::Error::Signing`].
pub trait Signable {
    /// Signs `self` with the key at `key_path`.
    ///
    /// `hash_alg` applies to EC and RSA keys; Ed25519 keys sign the message
    /// directly.
    fn sign(&mut self, key_path: PathBuf, hash_alg: HashAlgorithm) -> Result<()>;
}
