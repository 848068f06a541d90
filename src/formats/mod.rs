//! # Payload Formats
//!
//! A formatter turns a completed build object into the payload the storage
//! and signing layer persists. The set of formatters is closed:
//!
//! - [`InTotoIte6`]: an in-toto v0.1 / SLSA v0.1 provenance statement, meant to
//!   be wrapped in a signing envelope
//! - [`Tekton`]: the build status passed through unchanged, after the build's
//!   signed results have been verified
//!
//! [`Formatter`] selects one of them from [`crate::Config`]; every variant
//! implements [`Payloader`].
//!
//! ## Examples
//!
//! ```
//! use chains_attest::Config;
//! use chains_attest::build::{BuildObject, BuildRecord};
//! use chains_attest::formats::{Formatter, Payload, PayloadType, Payloader};
//!
//! let config = Config::default();
//! let formatter = Formatter::new(&config);
//! assert_eq!(formatter.payload_type(), PayloadType::InTotoIte6);
//! assert!(formatter.wrap());
//!
//! let payload = formatter
//!     .create_payload(&BuildObject::from(BuildRecord::new("build")))
//!     .unwrap();
//! assert!(matches!(payload, Payload::Provenance(_)));
//! ```

use crate::Config;
use crate::build::{BuildObject, BuildRecord, BuildStatus};
use crate::error::{Error, Result};
use crate::provenance::generators::{generate_provenance_statement, make_builder};
use crate::provenance::statement::{ProvenanceBuilder, ProvenanceStatement};
use crate::provenance::subjects::{ResultSubjectExtractor, SubjectExtractor};
use crate::verify::{SpireVerifier, VerificationOutcome, VerificationPolicy};

use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadType {
    #[default]
    #[serde(rename = "in-toto")]
    InTotoIte6,
    #[serde(rename = "tekton")]
    Tekton,
}

impl PayloadType {
    pub const ALL: [PayloadType; 2] = [PayloadType::InTotoIte6, PayloadType::Tekton];

    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadType::InTotoIte6 => "in-toto",
            PayloadType::Tekton => "tekton",
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PayloadType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Invalid payload format '{s}'. Valid options are: in-toto, tekton"
                ))
            })
    }
}

/// What a formatter hands to the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Provenance(ProvenanceStatement),
    Status(BuildStatus),
}

/// The contract every formatter fulfils.
pub trait Payloader: Send + Sync {
    fn payload_type(&self) -> PayloadType;

    /// Whether the payload should be embedded in a signing envelope.
    fn wrap(&self) -> bool;

    fn create_payload(&self, obj: &BuildObject) -> Result<Payload>;
}

fn task_run<'a>(obj: &'a BuildObject, formatter: PayloadType) -> Result<&'a BuildRecord> {
    obj.as_task_run().ok_or_else(|| {
        Error::UnsupportedInputKind(format!(
            "{formatter} does not support type: {}",
            obj.kind()
        ))
    })
}

/// Produces SLSA v0.1 provenance statements.
#[derive(Clone)]
pub struct InTotoIte6 {
    builder: ProvenanceBuilder,
    subjects: Arc<dyn SubjectExtractor + Send + Sync>,
}

impl InTotoIte6 {
    pub fn new(builder_id: &str) -> Self {
        Self {
            builder: make_builder(builder_id),
            subjects: Arc::new(ResultSubjectExtractor),
        }
    }

    /// Replaces the default result-convention subject extraction.
    pub fn with_subject_extractor(
        mut self,
        subjects: Arc<dyn SubjectExtractor + Send + Sync>,
    ) -> Self {
        self.subjects = subjects;
        self
    }

    pub fn builder_id(&self) -> &str {
        &self.builder.id
    }

    pub fn create_statement(&self, record: &BuildRecord) -> ProvenanceStatement {
        generate_provenance_statement(record, &self.builder, self.subjects.as_ref())
    }
}

impl fmt::Debug for InTotoIte6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InTotoIte6")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl Payloader for InTotoIte6 {
    fn payload_type(&self) -> PayloadType {
        PayloadType::InTotoIte6
    }

    fn wrap(&self) -> bool {
        true
    }

    fn create_payload(&self, obj: &BuildObject) -> Result<Payload> {
        let record = task_run(obj, self.payload_type())?;
        Ok(Payload::Provenance(self.create_statement(record)))
    }
}

/// Passes the build status through once its signed results verify.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tekton {
    verifier: SpireVerifier,
}

impl Tekton {
    pub fn new(policy: VerificationPolicy) -> Self {
        Self {
            verifier: SpireVerifier::new(policy),
        }
    }
}

impl Payloader for Tekton {
    fn payload_type(&self) -> PayloadType {
        PayloadType::Tekton
    }

    fn wrap(&self) -> bool {
        false
    }

    fn create_payload(&self, obj: &BuildObject) -> Result<Payload> {
        let record = task_run(obj, self.payload_type())?;

        if let VerificationOutcome::Verified { results } = self.verifier.verify(record)? {
            info!(
                "Successfully verified SPIRE signatures on {results} results of {}",
                record.name()
            );
        }

        Ok(Payload::Status(record.status.clone()))
    }
}

/// The closed set of formatters.
#[derive(Debug, Clone)]
pub enum Formatter {
    InTotoIte6(InTotoIte6),
    Tekton(Tekton),
}

impl Formatter {
    pub fn new(config: &Config) -> Self {
        match config.format {
            PayloadType::InTotoIte6 => Formatter::InTotoIte6(InTotoIte6::new(&config.builder.id)),
            PayloadType::Tekton => Formatter::Tekton(Tekton::new(config.verification)),
        }
    }

    fn inner(&self) -> &dyn Payloader {
        match self {
            Formatter::InTotoIte6(f) => f,
            Formatter::Tekton(f) => f,
        }
    }
}

impl Payloader for Formatter {
    fn payload_type(&self) -> PayloadType {
        self.inner().payload_type()
    }

    fn wrap(&self) -> bool {
        self.inner().wrap()
    }

    fn create_payload(&self, obj: &BuildObject) -> Result<Payload> {
        self.inner().create_payload(obj)
    }
}
