use crate::build::{BuildRecord, BuildResult};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::verify::{SIGNATURE_SUFFIX, SVID_RESULT};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use openssl::hash::MessageDigest;
use openssl::pkey::{HasPublic, Id, PKey, PKeyRef, Private};
use openssl::sign::{Signer, Verifier};
use openssl::x509::X509;
use std::fs::read;
use std::path::Path;
use zeroize::{ZeroizeOnDrop, Zeroizing};

pub mod signable;

/// Secure wrapper for private key data that zeroizes on drop
#[derive(ZeroizeOnDrop)]
pub struct SecurePrivateKey {
    #[zeroize(skip)]
    pkey: PKey<Private>,
    // Store the original key bytes in case we need them
    _key_data: Zeroizing<Vec<u8>>,
}

impl SecurePrivateKey {
    /// Create a new SecurePrivateKey from raw PEM data
    pub fn from_pem(pem_data: Vec<u8>) -> Result<Self> {
        let zeroizing_pem = Zeroizing::new(pem_data);

        let pkey = PKey::private_key_from_pem(&zeroizing_pem)
            .map_err(|e| Error::Signing(format!("Failed to load private key: {e}")))?;

        Ok(Self {
            pkey,
            _key_data: zeroizing_pem,
        })
    }

    /// Get a reference to the inner PKey
    pub fn as_pkey(&self) -> &PKey<Private> {
        &self.pkey
    }
}

/// Load a private key from a file path with automatic zeroization
pub fn load_private_key(key_path: &Path) -> Result<SecurePrivateKey> {
    let key_data = read(key_path)?;
    SecurePrivateKey::from_pem(key_data)
}

pub fn pkey_to_secure(pkey: PKey<Private>) -> Result<SecurePrivateKey> {
    let pem_data = pkey
        .private_key_to_pem_pkcs8()
        .map_err(|e| Error::Signing(format!("Failed to export key to PEM: {e}")))?;

    SecurePrivateKey::from_pem(pem_data)
}

fn message_digest(algorithm: &HashAlgorithm) -> MessageDigest {
    match algorithm {
        HashAlgorithm::Sha256 => MessageDigest::sha256(),
        HashAlgorithm::Sha384 => MessageDigest::sha384(),
        HashAlgorithm::Sha512 => MessageDigest::sha512(),
    }
}

/// Sign data with a specific hash algorithm and automatic key zeroization
///
/// Ed25519 keys ignore `algorithm`: they sign the message itself.
pub fn sign_data_with_algorithm(
    data: &[u8],
    private_key: &SecurePrivateKey,
    algorithm: &HashAlgorithm,
) -> Result<Vec<u8>> {
    let pkey = private_key.as_pkey();

    if pkey.id() == Id::ED25519 {
        let mut signer = Signer::new_without_digest(pkey)
            .map_err(|e| Error::Signing(format!("Failed to create signer: {e}")))?;
        return signer
            .sign_oneshot_to_vec(data)
            .map_err(|e| Error::Signing(format!("Failed to sign data: {e}")));
    }

    let mut signer = Signer::new(message_digest(algorithm), pkey)
        .map_err(|e| Error::Signing(format!("Failed to create signer: {e}")))?;

    signer
        .update(data)
        .map_err(|e| Error::Signing(format!("Failed to update signer: {e}")))?;

    // Sign to a zeroizing vector first to ensure cleanup
    let sig_len = signer
        .len()
        .map_err(|e| Error::Signing(format!("Failed to get signature length: {e}")))?;
    let mut signature = Zeroizing::new(vec![0u8; sig_len]);
    let len = signer
        .sign(&mut signature)
        .map_err(|e| Error::Signing(format!("Failed to sign data: {e}")))?;

    Ok(signature[..len].to_vec())
}

/// Verify signature with a public key using the specified algorithm
pub fn verify_signature_with_algorithm<T: HasPublic>(
    data: &[u8],
    signature: &[u8],
    public_key: &PKeyRef<T>,
    algorithm: &HashAlgorithm,
) -> Result<bool> {
    if public_key.id() == Id::ED25519 {
        let mut verifier =
            Verifier::new_without_digest(public_key).map_err(|e| Error::Signing(e.to_string()))?;
        return verifier
            .verify_oneshot(signature, data)
            .map_err(|e| Error::Signing(e.to_string()));
    }

    let mut verifier = Verifier::new(message_digest(algorithm), public_key)
        .map_err(|e| Error::Signing(e.to_string()))?;

    verifier
        .update(data)
        .map_err(|e| Error::Signing(e.to_string()))?;

    verifier
        .verify(signature)
        .map_err(|e| Error::Signing(e.to_string()))
}

/// Publishes `cert_pem` as the build's `SVID` result and adds a `<name>.sig`
/// result for every other result, replacing signatures already present.
///
/// Signatures use SHA-256 for EC and RSA keys and the raw value for Ed25519,
/// which is what [`crate::verify`] checks.
pub fn sign_results(
    record: &mut BuildRecord,
    private_key: &SecurePrivateKey,
    cert_pem: &str,
) -> Result<()> {
    let cert = X509::from_pem(cert_pem.as_bytes())
        .map_err(|e| Error::Validation(format!("Invalid certificate: {e}")))?;
    let cert_key = cert
        .public_key()
        .map_err(|e| Error::Validation(format!("Invalid certificate key: {e}")))?;
    if !cert_key.public_eq(private_key.as_pkey()) {
        return Err(Error::Validation(
            "Signing key does not match the certificate".to_string(),
        ));
    }

    let results = &mut record.status.results;
    let unsigned: Vec<(String, String)> = results
        .iter()
        .filter(|r| r.name != SVID_RESULT && !r.name.ends_with(SIGNATURE_SUFFIX))
        .map(|r| (r.name.clone(), r.value.clone()))
        .collect();

    upsert_result(results, SVID_RESULT, cert_pem);
    for (name, value) in unsigned {
        let signature =
            sign_data_with_algorithm(value.as_bytes(), private_key, &HashAlgorithm::Sha256)?;
        upsert_result(
            results,
            &format!("{name}{SIGNATURE_SUFFIX}"),
            &STANDARD.encode(signature),
        );
    }

    Ok(())
}

fn upsert_result(results: &mut Vec<BuildResult>, name: &str, value: &str) {
    match results.iter_mut().find(|r| r.name == name) {
        Some(existing) => existing.value = value.to_string(),
        None => results.push(BuildResult {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
