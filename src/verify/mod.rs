//! # SPIRE Result Verification
//!
//! Checks that the results a build reports were signed by the workload that
//! produced them. The build publishes its identity certificate as the result
//! `SVID` (PEM, X.509) and, for every other result `K`, a detached signature
//! as the result `K.sig` (standard base64).
//!
//! The check is linear and fail-fast:
//!
//! 1. no `SVID` result: nothing to verify, the call succeeds (see
//!    [`VerificationPolicy`] for the strict alternative)
//! 2. the certificate must parse, otherwise [`VerificationError::InvalidCertificate`]
//! 3. every result other than `SVID` and `*.sig` needs a sibling signature
//!    that decodes and verifies under the certificate's public key
//!
//! Nothing here mutates the record.
//!
//! ## Examples
//!
//! ```
//! use chains_attest::build::BuildRecord;
//! use chains_attest::verify::{SpireVerifier, VerificationOutcome};
//!
//! // no identity certificate: verification is skipped
//! let record = BuildRecord::new("build").with_result("IMAGE_DIGEST", "sha256:00");
//! assert_eq!(
//!     SpireVerifier::default().verify(&record),
//!     Ok(VerificationOutcome::Skipped)
//! );
//! ```

use crate::build::{BuildRecord, BuildResult};
use crate::error::VerificationError;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::warn;
use openssl::x509::X509;
use std::collections::BTreeMap;

pub mod keys;

use keys::VerificationKey;

/// Name of the result carrying the PEM identity certificate.
pub const SVID_RESULT: &str = "SVID";

/// Suffix naming the detached signature of a result.
pub const SIGNATURE_SUFFIX: &str = ".sig";

/// What to do with builds that publish no identity certificate.
///
/// The default accepts them unverified. That is a low-assurance choice kept
/// for compatibility; deployments that require every build to be signed set
/// `require_certificate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationPolicy {
    pub require_certificate: bool,
}

impl VerificationPolicy {
    pub fn strict() -> Self {
        Self {
            require_certificate: true,
        }
    }
}

/// How a successful verification call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Every signed result checked out.
    Verified { results: usize },
    /// No identity certificate was published, nothing was checked.
    Skipped,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpireVerifier {
    policy: VerificationPolicy,
}

impl SpireVerifier {
    pub fn new(policy: VerificationPolicy) -> Self {
        Self { policy }
    }

    pub fn verify(&self, record: &BuildRecord) -> Result<VerificationOutcome, VerificationError> {
        self.verify_results(record.results())
    }

    pub fn verify_results(
        &self,
        results: &[BuildResult],
    ) -> Result<VerificationOutcome, VerificationError> {
        // sorted so the first failure reported is stable across runs
        let by_name: BTreeMap<&str, &str> = results
            .iter()
            .map(|r| (r.name.as_str(), r.value.as_str()))
            .collect();

        let Some(svid) = by_name.get(SVID_RESULT) else {
            if self.policy.require_certificate {
                return Err(VerificationError::MissingCertificate);
            }
            warn!("No SVID certificate found, skipping SPIRE verification");
            return Ok(VerificationOutcome::Skipped);
        };

        let cert = X509::from_pem(svid.as_bytes())
            .map_err(|e| VerificationError::InvalidCertificate(e.to_string()))?;
        // an unsupported key only fails once there is something to check
        let key = VerificationKey::from_certificate(&cert);

        let mut checked = 0;
        for (name, value) in &by_name {
            if *name == SVID_RESULT || name.ends_with(SIGNATURE_SUFFIX) {
                continue;
            }
            verify_one(&key, name, value, &by_name)?;
            checked += 1;
        }

        Ok(VerificationOutcome::Verified { results: checked })
    }
}

/// Verifies a build's results under the default (lenient) policy.
pub fn verify(record: &BuildRecord) -> Result<VerificationOutcome, VerificationError> {
    SpireVerifier::default().verify(record)
}

fn verify_one(
    key: &Result<VerificationKey, VerificationError>,
    name: &str,
    value: &str,
    results: &BTreeMap<&str, &str>,
) -> Result<(), VerificationError> {
    let signature = results
        .get(format!("{name}{SIGNATURE_SUFFIX}").as_str())
        .ok_or_else(|| VerificationError::MissingSignature(name.to_string()))?;

    let signature = STANDARD
        .decode(signature.trim())
        .map_err(|_| VerificationError::InvalidSignatureEncoding(name.to_string()))?;

    let key = key.as_ref().map_err(Clone::clone)?;

    if key.verify(value.as_bytes(), &signature) {
        Ok(())
    } else {
        Err(VerificationError::InvalidSignature(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::test_utils::{KeyKind, generate_key, self_signed_cert};
    use crate::signing::{pkey_to_secure, sign_results};
    use openssl::dsa::Dsa;
    use openssl::pkey::PKey;

    fn dsa_certificate() -> String {
        let pkey = PKey::from_dsa(Dsa::generate(2048).unwrap()).unwrap();
        self_signed_cert(&pkey_to_secure(pkey).unwrap())
    }

    fn signed_record(kind: KeyKind) -> BuildRecord {
        let key = generate_key(kind);
        let cert = self_signed_cert(&key);
        let mut record = BuildRecord::new("build")
            .with_result("IMAGE_URL", "gcr.io/myimage")
            .with_result("X", "value");
        sign_results(&mut record, &key, &cert).unwrap();
        record
    }

    fn set_result(record: &mut BuildRecord, name: &str, value: &str) {
        let result = record
            .status
            .results
            .iter_mut()
            .find(|r| r.name == name)
            .unwrap();
        result.value = value.to_string();
    }

    #[test]
    fn test_no_svid_soft_skips() {
        let record = BuildRecord::new("build").with_result("X", "value");
        assert_eq!(verify(&record), Ok(VerificationOutcome::Skipped));
    }

    #[test]
    fn test_no_svid_strict_fails() {
        let record = BuildRecord::new("build").with_result("X", "value");
        let verifier = SpireVerifier::new(VerificationPolicy::strict());
        assert_eq!(
            verifier.verify(&record),
            Err(VerificationError::MissingCertificate)
        );
    }

    #[test]
    fn test_invalid_certificate() {
        let garbled = "-----BEGIN CERTIFICATE-----\nnope\n-----END CERTIFICATE-----\n";
        let record = BuildRecord::new("build")
            .with_result(SVID_RESULT, garbled)
            .with_result("X", "value");

        assert!(matches!(
            verify(&record),
            Err(VerificationError::InvalidCertificate(_))
        ));
    }

    #[test]
    fn test_certificate_without_pem_block() {
        let record = BuildRecord::new("build").with_result(SVID_RESULT, "not pem at all");
        assert!(matches!(
            verify(&record),
            Err(VerificationError::InvalidCertificate(_))
        ));
    }

    #[test]
    fn test_each_key_type_verifies() {
        for kind in [KeyKind::Ec, KeyKind::Rsa, KeyKind::Ed25519] {
            let record = signed_record(kind);
            assert_eq!(
                verify(&record),
                Ok(VerificationOutcome::Verified { results: 2 }),
                "{kind:?} should verify"
            );
        }
    }

    #[test]
    fn test_tampered_value_fails_for_each_key_type() {
        for kind in [KeyKind::Ec, KeyKind::Rsa, KeyKind::Ed25519] {
            let mut record = signed_record(kind);
            set_result(&mut record, "X", "valuf");
            assert_eq!(
                verify(&record),
                Err(VerificationError::InvalidSignature("X".to_string())),
                "{kind:?} should reject a tampered value"
            );
        }
    }

    #[test]
    fn test_unsigned_result_fails() {
        let mut record = signed_record(KeyKind::Ec);
        record = record.with_result("EXTRA", "unsigned");

        assert_eq!(
            verify(&record),
            Err(VerificationError::MissingSignature("EXTRA".to_string()))
        );
    }

    #[test]
    fn test_bad_signature_encoding() {
        let mut record = signed_record(KeyKind::Ec);
        set_result(&mut record, "X.sig", "!!not base64!!");

        assert_eq!(
            verify(&record),
            Err(VerificationError::InvalidSignatureEncoding("X".to_string()))
        );
    }

    #[test]
    fn test_signature_from_other_key_fails() {
        let record = signed_record(KeyKind::Ec);
        let other = signed_record(KeyKind::Ec);
        let other_svid = other
            .results()
            .iter()
            .find(|r| r.name == SVID_RESULT)
            .unwrap()
            .value
            .clone();

        let mut swapped = record.clone();
        set_result(&mut swapped, SVID_RESULT, &other_svid);

        assert!(matches!(
            verify(&swapped),
            Err(VerificationError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_only_certificate_present() {
        let key = generate_key(KeyKind::Rsa);
        let record =
            BuildRecord::new("build").with_result(SVID_RESULT, &self_signed_cert(&key));
        assert_eq!(verify(&record), Ok(VerificationOutcome::Verified { results: 0 }));
    }

    #[test]
    fn test_unsupported_key_fails_on_first_signed_result() {
        let record = BuildRecord::new("build")
            .with_result(SVID_RESULT, &dsa_certificate())
            .with_result("X", "value")
            .with_result("X.sig", &STANDARD.encode(b"signature"));

        assert_eq!(
            verify(&record),
            Err(VerificationError::UnsupportedKeyType("DSA".to_string()))
        );
    }

    #[test]
    fn test_unsupported_key_with_nothing_to_check() {
        let record = BuildRecord::new("build").with_result(SVID_RESULT, &dsa_certificate());
        assert_eq!(verify(&record), Ok(VerificationOutcome::Verified { results: 0 }));
    }

    #[test]
    fn test_verification_does_not_mutate_record() {
        let record = signed_record(KeyKind::Ed25519);
        let before = record.clone();
        verify(&record).unwrap();
        assert_eq!(record, before);
    }
}
