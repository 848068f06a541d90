use crate::DEFAULT_BUILDER_ID;
use crate::formats::PayloadType;
use crate::hash::HashAlgorithm;

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum HashAlgorithmChoice {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithmChoice {
    pub fn to_hash_algorithm(&self) -> HashAlgorithm {
        match self {
            HashAlgorithmChoice::Sha256 => HashAlgorithm::Sha256,
            HashAlgorithmChoice::Sha384 => HashAlgorithm::Sha384,
            HashAlgorithmChoice::Sha512 => HashAlgorithm::Sha512,
        }
    }
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum FormatChoice {
    InToto,
    Tekton,
}

impl FormatChoice {
    pub fn to_payload_type(&self) -> PayloadType {
        match self {
            FormatChoice::InToto => PayloadType::InTotoIte6,
            FormatChoice::Tekton => PayloadType::Tekton,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the payload for a completed TaskRun
    Payload {
        /// Path to the TaskRun document (JSON or YAML)
        #[arg(long = "input")]
        input: PathBuf,

        /// Payload format
        #[arg(long = "format", value_enum, default_value = "in-toto")]
        format: FormatChoice,

        /// Builder id recorded in provenance statements
        #[arg(long = "builder-id", default_value = DEFAULT_BUILDER_ID)]
        builder_id: String,

        /// Path to private key file for signing the envelope (PEM format)
        #[arg(long = "key")]
        key: Option<PathBuf>,

        /// Hash algorithm to use for signing (default: sha256)
        #[arg(long = "hash-alg", value_enum, default_value = "sha256")]
        hash_alg: HashAlgorithmChoice,

        /// Output encoding (json or cbor)
        #[arg(long = "encoding", default_value = "json")]
        encoding: String,

        /// Reject TaskRuns without an SVID certificate
        #[arg(long = "strict")]
        strict: bool,
    },
    /// Verify the SPIRE signatures on a TaskRun's results
    Verify {
        /// Path to the TaskRun document (JSON or YAML)
        #[arg(long = "input")]
        input: PathBuf,

        /// Reject TaskRuns without an SVID certificate
        #[arg(long = "strict")]
        strict: bool,
    },
    /// Sign every result of a TaskRun and publish the certificate as SVID
    SignResults {
        /// Path to the TaskRun document (JSON or YAML)
        #[arg(long = "input")]
        input: PathBuf,

        /// Path to private key file for signing (PEM format)
        #[arg(long = "key")]
        key: PathBuf,

        /// Path to the PEM certificate matching the key
        #[arg(long = "cert")]
        cert: PathBuf,

        /// Write the signed TaskRun here instead of stdout
        #[arg(long = "output")]
        output: Option<PathBuf>,
    },
}
