use crate::error::{Error, Result};
use crate::hash::{self, HashAlgorithm};
use crate::signing;
use crate::signing::signable::Signable;

use openssl::pkey::{HasPublic, PKeyRef};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::path::PathBuf;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde_as(as = "serde_with::base64::Base64")]
    pub sig: Vec<u8>,
    pub keyid: String,
}

/// A Dead Simple Signing Envelope.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde_as(as = "serde_with::base64::Base64")]
    payload: Vec<u8>,
    payload_type: String,
    signatures: Vec<Signature>,
}

/// DSSE pre-authentication encoding:
/// `"DSSEv1" SP LEN(type) SP type SP LEN(payload) SP payload`.
pub fn pae(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(payload_type.len() + payload.len() + 32);
    encoded.extend_from_slice(b"DSSEv1 ");
    encoded.extend_from_slice(payload_type.len().to_string().as_bytes());
    encoded.push(b' ');
    encoded.extend_from_slice(payload_type.as_bytes());
    encoded.push(b' ');
    encoded.extend_from_slice(payload.len().to_string().as_bytes());
    encoded.push(b' ');
    encoded.extend_from_slice(payload);
    encoded
}

impl Envelope {
    pub fn new(payload: &[u8], payload_type: String) -> Self {
        Self {
            payload: payload.to_vec(),
            payload_type,
            signatures: vec![],
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn add_signature(&mut self, sig: Vec<u8>, keyid: String) -> Result<()> {
        if sig.is_empty() {
            return Err(Error::Signing("DSSE signature cannot be empty".to_string()));
        }

        self.signatures.push(Signature { sig, keyid });

        Ok(())
    }

    /// Checks the envelope carries a payload, a type and non-empty signatures.
    pub fn validate(&self) -> bool {
        if self.payload.is_empty() || self.payload_type.is_empty() || self.signatures.is_empty() {
            return false;
        }

        self.signatures.iter().all(|s| !s.sig.is_empty())
    }

    /// True when at least one signature verifies under `public_key`.
    pub fn verify<T: HasPublic>(
        &self,
        public_key: &PKeyRef<T>,
        hash_alg: HashAlgorithm,
    ) -> Result<bool> {
        if !self.validate() {
            return Ok(false);
        }

        let encoded = pae(&self.payload_type, &self.payload);
        for signature in &self.signatures {
            if signing::verify_signature_with_algorithm(
                &encoded,
                &signature.sig,
                public_key,
                &hash_alg,
            )? {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// Hex SHA-256 of the DER public key, used as the DSSE `keyid`.
pub fn key_id<T: HasPublic>(public_key: &PKeyRef<T>) -> Result<String> {
    let der = public_key
        .public_key_to_der()
        .map_err(|e| Error::Signing(format!("Failed to encode public key: {e}")))?;
    Ok(hash::calculate_hash_with_algorithm(
        &der,
        &HashAlgorithm::Sha256,
    ))
}

impl Signable for Envelope {
    fn sign(&mut self, key_path: PathBuf, hash_alg: HashAlgorithm) -> Result<()> {
        let private_key = signing::load_private_key(&key_path)?;

        let encoded = pae(&self.payload_type, &self.payload);
        let signature = signing::sign_data_with_algorithm(&encoded, &private_key, &hash_alg)?;
        let keyid = key_id(private_key.as_pkey())?;

        self.add_signature(signature, keyid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::test_utils::generate_temp_key;

    #[test]
    fn test_pae_encoding() {
        assert_eq!(
            pae("http://example.com/HelloWorld", b"hello world"),
            b"DSSEv1 29 http://example.com/HelloWorld 11 hello world".to_vec()
        );
    }

    #[test]
    fn test_empty_signature_rejected() {
        let mut envelope = Envelope::new(b"{}", "application/json".to_string());
        assert!(matches!(
            envelope.add_signature(vec![], String::new()),
            Err(Error::Signing(_))
        ));
        assert!(!envelope.validate());
    }

    #[test]
    fn test_sign_then_verify() -> Result<()> {
        let (key, dir) = generate_temp_key()?;
        let mut envelope = Envelope::new(b"{\"a\":1}", "application/json".to_string());

        envelope.sign(dir.path().join("test_key.pem"), HashAlgorithm::Sha256)?;

        assert!(envelope.validate());
        assert_eq!(envelope.signatures()[0].keyid, key_id(key.as_pkey())?);
        assert!(envelope.verify(key.as_pkey(), HashAlgorithm::Sha256)?);

        Ok(())
    }

    #[test]
    fn test_tampered_payload_fails_verification() -> Result<()> {
        let (key, dir) = generate_temp_key()?;
        let mut envelope = Envelope::new(b"{\"a\":1}", "application/json".to_string());
        envelope.sign(dir.path().join("test_key.pem"), HashAlgorithm::Sha256)?;

        envelope.payload = b"{\"a\":2}".to_vec();

        assert!(!envelope.verify(key.as_pkey(), HashAlgorithm::Sha256)?);
        Ok(())
    }

    #[test]
    fn test_json_shape() {
        let mut envelope = Envelope::new(b"hi", "text/plain".to_string());
        envelope.add_signature(vec![1, 2, 3], "k".to_string()).unwrap();

        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["payload"], "aGk=");
        assert_eq!(value["payloadType"], "text/plain");
        assert_eq!(value["signatures"][0]["sig"], "AQID");
        assert_eq!(value["signatures"][0]["keyid"], "k");
    }
}
