use crate::error::{Error, Result};

use super::commands::Commands;
use crate::build::{BuildObject, BuildRecord};
use crate::formats::{Formatter, Payloader};
use crate::in_toto;
use crate::signing;
use crate::verify::{SpireVerifier, VerificationOutcome, VerificationPolicy};
use crate::{BuilderConfig, Config};

use log::warn;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::fs;
use std::path::Path;

pub fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Payload {
            input,
            format,
            builder_id,
            key,
            hash_alg,
            encoding,
            strict,
        } => {
            let config = Config {
                builder: BuilderConfig { id: builder_id },
                format: format.to_payload_type(),
                verification: VerificationPolicy {
                    require_certificate: strict,
                },
            };
            let formatter = Formatter::new(&config);

            let obj = read_build_object(&input)?;
            let payload = formatter.create_payload(&obj)?;

            match key {
                Some(key_path) if formatter.wrap() => {
                    let envelope = in_toto::generate_signed_envelope(
                        &payload,
                        key_path,
                        hash_alg.to_hash_algorithm(),
                    )?;
                    print_encoded(&envelope, &encoding)
                }
                Some(_) => {
                    warn!(
                        "{} payloads are not wrapped, ignoring --key",
                        formatter.payload_type()
                    );
                    print_encoded(&payload, &encoding)
                }
                None => print_encoded(&payload, &encoding),
            }
        }
        Commands::Verify { input, strict } => {
            let record = read_task_run(&input)?;
            let verifier = SpireVerifier::new(VerificationPolicy {
                require_certificate: strict,
            });

            match verifier.verify(&record)? {
                VerificationOutcome::Verified { results } => {
                    println!("Verified SPIRE signatures on {results} results");
                }
                VerificationOutcome::Skipped => {
                    println!("No SVID certificate found, verification skipped");
                }
            }
            Ok(())
        }
        Commands::SignResults {
            input,
            key,
            cert,
            output,
        } => {
            let mut record = read_task_run(&input)?;
            let private_key = signing::load_private_key(&key)?;
            let cert_pem = fs::read_to_string(&cert)?;

            signing::sign_results(&mut record, &private_key, &cert_pem)?;

            let json =
                to_string_pretty(&record).map_err(|e| Error::Serialization(e.to_string()))?;
            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    println!("Signed TaskRun written to {}", path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
    }
}

pub fn read_build_object(path: &Path) -> Result<BuildObject> {
    let contents = fs::read_to_string(path)?;
    BuildObject::parse(&contents)
}

fn read_task_run(path: &Path) -> Result<BuildRecord> {
    match read_build_object(path)? {
        BuildObject::TaskRun(record) => Ok(*record),
        BuildObject::Other { kind } => Err(Error::UnsupportedInputKind(kind)),
    }
}

fn print_encoded<T: Serialize>(value: &T, encoding: &str) -> Result<()> {
    match encoding.to_lowercase().as_str() {
        "json" => {
            let json = to_string_pretty(value).map_err(|e| Error::Serialization(e.to_string()))?;
            println!("{json}");
        }
        "cbor" => {
            let cbor = serde_cbor::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
            println!("{}", hex::encode(&cbor));
        }
        _ => {
            return Err(Error::Validation(format!(
                "Invalid output encoding '{encoding}'. Valid options are: json, cbor"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::{FormatChoice, HashAlgorithmChoice};
    use crate::signing::test_utils::{KeyKind, generate_key, self_signed_cert};
    use tempfile::tempdir;

    fn write_key_and_cert(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let key = generate_key(KeyKind::Ec);
        let key_path = dir.join("key.pem");
        let cert_path = dir.join("cert.pem");
        fs::write(&key_path, key.as_pkey().private_key_to_pem_pkcs8().unwrap()).unwrap();
        fs::write(&cert_path, self_signed_cert(&key)).unwrap();
        (key_path, cert_path)
    }

    #[test]
    fn test_read_build_object_missing_file() {
        assert!(matches!(
            read_build_object(Path::new("/nonexistent/taskrun.json")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_read_task_run_rejects_other_kinds() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("pr.yaml");
        fs::write(&path, "kind: PipelineRun\n")?;

        assert!(matches!(
            read_task_run(&path),
            Err(Error::UnsupportedInputKind(k)) if k == "PipelineRun"
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_encoding() {
        assert!(matches!(
            print_encoded(&serde_json::json!({}), "xml"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_sign_then_verify_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let (key, cert) = write_key_and_cert(dir.path());
        let input = dir.path().join("taskrun.json");
        let signed = dir.path().join("signed.json");
        let record = BuildRecord::new("build").with_result("X", "value");
        fs::write(&input, serde_json::to_string(&record)?)?;

        handle_command(Commands::SignResults {
            input,
            key,
            cert,
            output: Some(signed.clone()),
        })?;

        handle_command(Commands::Verify {
            input: signed.clone(),
            strict: true,
        })?;

        let signed_record = read_task_run(&signed)?;
        assert_eq!(signed_record.results().len(), 3);
        Ok(())
    }

    #[test]
    fn test_verify_rejects_tampered_file() -> Result<()> {
        let dir = tempdir()?;
        let (key, cert) = write_key_and_cert(dir.path());
        let input = dir.path().join("taskrun.json");
        let signed = dir.path().join("signed.json");
        fs::write(
            &input,
            serde_json::to_string(&BuildRecord::new("build").with_result("X", "value"))?,
        )?;
        handle_command(Commands::SignResults {
            input,
            key,
            cert,
            output: Some(signed.clone()),
        })?;

        let mut record = read_task_run(&signed)?;
        record.status.results[0].value = "valuf".to_string();
        fs::write(&signed, serde_json::to_string(&record)?)?;

        let result = handle_command(Commands::Verify {
            input: signed,
            strict: false,
        });
        assert!(matches!(
            result,
            Err(Error::Verification(crate::VerificationError::InvalidSignature(_)))
        ));
        Ok(())
    }

    #[test]
    fn test_payload_with_envelope() -> Result<()> {
        let dir = tempdir()?;
        let (key, _) = write_key_and_cert(dir.path());
        let input = dir.path().join("taskrun.json");
        fs::write(&input, r#"{"kind": "TaskRun", "metadata": {"name": "build"}}"#)?;

        handle_command(Commands::Payload {
            input,
            format: FormatChoice::InToto,
            builder_id: "test_builder".to_string(),
            key: Some(key),
            hash_alg: HashAlgorithmChoice::Sha256,
            encoding: "cbor".to_string(),
            strict: false,
        })
    }
}
