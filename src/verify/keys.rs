use crate::error::VerificationError;

use openssl::hash::MessageDigest;
use openssl::pkey::{Id, PKey, Public};
use openssl::sign::Verifier;
use openssl::x509::X509;

/// A certificate public key of one of the supported signature families.
pub enum VerificationKey {
    /// ECDSA, ASN.1 DER signature over SHA-256 of the message.
    Ec(PKey<Public>),
    /// RSA PKCS#1 v1.5 over SHA-256 of the message.
    Rsa(PKey<Public>),
    /// Ed25519 over the message itself.
    Ed25519(PKey<Public>),
}

impl VerificationKey {
    pub fn from_certificate(cert: &X509) -> Result<Self, VerificationError> {
        let pkey = cert
            .public_key()
            .map_err(|e| VerificationError::InvalidCertificate(e.to_string()))?;
        Self::from_public_key(pkey)
    }

    pub fn from_public_key(pkey: PKey<Public>) -> Result<Self, VerificationError> {
        match pkey.id() {
            Id::EC => Ok(VerificationKey::Ec(pkey)),
            Id::RSA => Ok(VerificationKey::Rsa(pkey)),
            Id::ED25519 => Ok(VerificationKey::Ed25519(pkey)),
            other => Err(VerificationError::UnsupportedKeyType(key_type_name(other))),
        }
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            VerificationKey::Ec(_) => "ecdsa-sha256",
            VerificationKey::Rsa(_) => "rsa-pkcs1v15-sha256",
            VerificationKey::Ed25519(_) => "ed25519",
        }
    }

    /// Returns true only for a well-formed signature that matches `data`.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let outcome = match self {
            // openssl's default RSA padding is PKCS#1 v1.5
            VerificationKey::Ec(pkey) | VerificationKey::Rsa(pkey) => {
                Verifier::new(MessageDigest::sha256(), pkey).and_then(|mut verifier| {
                    verifier.update(data)?;
                    verifier.verify(signature)
                })
            }
            VerificationKey::Ed25519(pkey) => Verifier::new_without_digest(pkey)
                .and_then(|mut verifier| verifier.verify_oneshot(signature, data)),
        };

        // malformed DER or wrong-length signatures surface as errors
        outcome.unwrap_or(false)
    }
}

fn key_type_name(id: Id) -> String {
    match id {
        Id::DSA => "DSA".to_string(),
        Id::DH => "DH".to_string(),
        Id::ED448 => "Ed448".to_string(),
        other => format!("{other:?}"),
    }
}
