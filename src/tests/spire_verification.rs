use super::common::load_task_run;

use crate::Config;
use crate::build::{BuildObject, BuildRecord};
use crate::error::{Error, Result, VerificationError};
use crate::formats::{Formatter, Payload, PayloadType, Payloader};
use crate::signing::sign_results;
use crate::signing::test_utils::{KeyKind, generate_key, self_signed_cert};
use crate::verify::{
    SIGNATURE_SUFFIX, SVID_RESULT, SpireVerifier, VerificationOutcome, VerificationPolicy,
};

fn signed_record(kind: KeyKind, record: BuildRecord) -> Result<BuildRecord> {
    let key = generate_key(kind);
    let cert = self_signed_cert(&key);
    let mut record = record;
    sign_results(&mut record, &key, &cert)?;
    Ok(record)
}

fn signed_value() -> Result<BuildRecord> {
    signed_record(KeyKind::Ec, BuildRecord::new("build").with_result("X", "value"))
}

fn set_result(record: &mut BuildRecord, name: &str, value: &str) {
    if let Some(result) = record.status.results.iter_mut().find(|r| r.name == name) {
        result.value = value.to_string();
    }
}

fn tekton_formatter(policy: VerificationPolicy) -> Formatter {
    Formatter::new(&Config {
        format: PayloadType::Tekton,
        verification: policy,
        ..Default::default()
    })
}

// A build signed with an EC identity verifies, and a single changed byte
// in a result value is caught
#[test]
fn test_ec_signed_result_and_tamper() -> Result<()> {
    let record = signed_value()?;

    assert_eq!(
        SpireVerifier::default().verify(&record),
        Ok(VerificationOutcome::Verified { results: 1 })
    );

    let mut tampered = record.clone();
    set_result(&mut tampered, "X", "valuf");
    assert_eq!(
        SpireVerifier::default().verify(&tampered),
        Err(VerificationError::InvalidSignature("X".to_string()))
    );
    Ok(())
}

#[test]
fn test_every_key_family_verifies() -> Result<()> {
    for kind in [KeyKind::Ec, KeyKind::Rsa, KeyKind::Ed25519] {
        let record = signed_record(
            kind,
            BuildRecord::new("build")
                .with_result("IMAGE_URL", "gcr.io/myimage")
                .with_result("IMAGE_DIGEST", "sha256:00"),
        )?;
        assert_eq!(
            SpireVerifier::default().verify(&record),
            Ok(VerificationOutcome::Verified { results: 2 }),
            "{kind:?}"
        );
    }
    Ok(())
}

#[test]
fn test_fixture_signed_then_verified() -> Result<()> {
    let record = signed_record(KeyKind::Ec, load_task_run("taskrun1.json")?)?;

    let names: Vec<&str> = record.results().iter().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&SVID_RESULT));
    assert!(names.contains(&format!("IMAGE_DIGEST{SIGNATURE_SUFFIX}").as_str()));

    assert_eq!(
        crate::verify::verify(&record),
        Ok(VerificationOutcome::Verified { results: 2 })
    );
    Ok(())
}

#[test]
fn test_missing_signature() -> Result<()> {
    let mut record = signed_value()?;
    record.status.results.retain(|r| r.name != "X.sig");

    assert_eq!(
        SpireVerifier::default().verify(&record),
        Err(VerificationError::MissingSignature("X".to_string()))
    );
    Ok(())
}

#[test]
fn test_signature_not_base64() -> Result<()> {
    let mut record = signed_value()?;
    set_result(&mut record, "X.sig", "not base64!");

    assert_eq!(
        SpireVerifier::default().verify(&record),
        Err(VerificationError::InvalidSignatureEncoding("X".to_string()))
    );
    Ok(())
}

#[test]
fn test_garbage_certificate() {
    let record = BuildRecord::new("build")
        .with_result(SVID_RESULT, "not a certificate")
        .with_result("X", "value");

    assert!(matches!(
        SpireVerifier::default().verify(&record),
        Err(VerificationError::InvalidCertificate(_))
    ));
}

#[test]
fn test_certificate_only_verifies_nothing() -> Result<()> {
    let record = signed_record(KeyKind::Ec, BuildRecord::new("build"))?;

    assert_eq!(
        SpireVerifier::new(VerificationPolicy::strict()).verify(&record),
        Ok(VerificationOutcome::Verified { results: 0 })
    );
    Ok(())
}

#[test]
fn test_policy_decides_unsigned_builds() {
    let record = BuildRecord::new("build").with_result("X", "value");

    assert_eq!(
        SpireVerifier::default().verify(&record),
        Ok(VerificationOutcome::Skipped)
    );
    assert_eq!(
        SpireVerifier::new(VerificationPolicy::strict()).verify(&record),
        Err(VerificationError::MissingCertificate)
    );
}

#[test]
fn test_tekton_formatter_gates_on_verification() -> Result<()> {
    let record = signed_value()?;
    let formatter = tekton_formatter(VerificationPolicy::strict());

    let payload = formatter.create_payload(&BuildObject::from(record.clone()))?;
    assert_eq!(payload, Payload::Status(record.status.clone()));

    let mut tampered = record;
    set_result(&mut tampered, "X", "valuf");
    match formatter.create_payload(&BuildObject::from(tampered)) {
        Err(Error::Verification(VerificationError::InvalidSignature(name))) => {
            assert_eq!(name, "X");
        }
        other => panic!("expected a signature failure, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_tekton_formatter_unsigned_build() -> Result<()> {
    let obj = BuildObject::from(BuildRecord::new("build").with_result("X", "value"));

    assert!(matches!(
        tekton_formatter(VerificationPolicy::default()).create_payload(&obj)?,
        Payload::Status(_)
    ));
    assert!(matches!(
        tekton_formatter(VerificationPolicy::strict()).create_payload(&obj),
        Err(Error::Verification(VerificationError::MissingCertificate))
    ));
    Ok(())
}
