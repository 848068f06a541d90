//! # chains-attest
//!
//! Build provenance attestation and result-signature verification for
//! pipeline TaskRuns.
//!
//! Once a build finishes, its execution record can be turned into either:
//!
//! - an in-toto v0.1 Statement with an SLSA v0.1 provenance predicate
//!   ([`formats::InTotoIte6`]), ready to be wrapped in a DSSE envelope, or
//! - the build status itself ([`formats::Tekton`]), released only after the
//!   results the build signed with its SPIFFE identity (SVID) verify.
//!
//! ## Quick Start
//!
//! ```bash
//! chains-attest payload --input taskrun.json --builder-id https://builder.example/v1
//! chains-attest verify --input taskrun.json --strict
//! ```
//!
//! ```
//! use chains_attest::Config;
//! use chains_attest::build::BuildObject;
//! use chains_attest::formats::{Formatter, Payloader};
//!
//! let obj = BuildObject::parse(r#"{"metadata": {"name": "build-1"}}"#).unwrap();
//! let payload = Formatter::new(&Config::default()).create_payload(&obj).unwrap();
//! let json = serde_json::to_value(&payload).unwrap();
//! assert_eq!(json["predicate"]["recipe"]["entryPoint"], "build-1");
//! ```

pub mod build;
pub mod cli;
pub mod error;
pub mod formats;
pub mod hash;
pub mod in_toto;
pub mod provenance;
pub mod signing;
#[cfg(test)]
mod tests;
pub mod verify;

use formats::PayloadType;
use verify::VerificationPolicy;

// Re-export error types
pub use error::{Error, Result, VerificationError};

/// Builder id used when none is configured.
pub const DEFAULT_BUILDER_ID: &str = "https://tekton.dev/chains/v2";

/// Identity of the system that ran the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    pub id: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_BUILDER_ID.to_string(),
        }
    }
}

/// Formatter configuration, fixed for the lifetime of a formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub builder: BuilderConfig,
    /// Which formatter to build.
    pub format: PayloadType,
    /// How the pass-through formatter treats builds without an SVID.
    pub verification: VerificationPolicy,
}

/// Initialize logging for the CLI
///
/// # Examples
///
/// ```
/// use chains_attest::init_logging;
///
/// // Note: This might fail if already initialized
/// let result = init_logging();
/// assert!(result.is_ok() || result.is_err());
/// ```
pub fn init_logging() -> Result<()> {
    env_logger::try_init().map_err(|e| Error::InitializationError(e.to_string()))
}
