//! # in-toto Envelope Wrapping
//!
//! Statements produced by a wrapping formatter are meant to be stored inside
//! a signed Dead Simple Signing Envelope (DSSE). This module serializes a
//! payload to JSON and signs it into an [`dsse::Envelope`].
//!
//! ## Examples
//!
//! ```no_run
//! use chains_attest::build::BuildRecord;
//! use chains_attest::formats::{InTotoIte6, Payloader};
//! use chains_attest::hash::HashAlgorithm;
//! use chains_attest::in_toto::generate_signed_envelope;
//! use std::path::PathBuf;
//!
//! let formatter = InTotoIte6::new("https://builder.example/v1");
//! let payload = formatter
//!     .create_payload(&BuildRecord::new("build").into())
//!     .unwrap();
//!
//! let envelope = generate_signed_envelope(
//!     &payload,
//!     PathBuf::from("private_key.pem"),
//!     HashAlgorithm::Sha256,
//! )
//! .unwrap();
//! assert!(envelope.validate());
//! ```

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::signing::signable::Signable;

use serde::Serialize;
use std::path::PathBuf;

pub mod dsse;

use dsse::Envelope;

pub const DSSE_PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

/// Serializes `payload` and signs it into a DSSE envelope.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized, the key cannot be
/// loaded, or signing fails.
pub fn generate_signed_envelope<T: Serialize>(
    payload: &T,
    key_path: PathBuf,
    hash_alg: HashAlgorithm,
) -> Result<Envelope> {
    let serialized =
        serde_json::to_vec(payload).map_err(|e| Error::Serialization(e.to_string()))?;

    let mut envelope = Envelope::new(&serialized, DSSE_PAYLOAD_TYPE.to_string());
    envelope.sign(key_path, hash_alg)?;

    Ok(envelope)
}
