use thiserror::Error;

/// Reasons a build's signed results are rejected.
///
/// Every variant is terminal for the verification call that produced it; the
/// offending result key is carried where one exists so the caller can log and
/// reject the build.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("no SVID certificate found in build results")]
    MissingCertificate,

    #[error("invalid SVID: {0}")]
    InvalidCertificate(String),

    #[error("no signature found for {0}")]
    MissingSignature(String),

    #[error("invalid signature encoding for {0}")]
    InvalidSignatureEncoding(String),

    #[error("invalid signature for {0}")]
    InvalidSignature(String),

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Initialization error: {0}")]
    InitializationError(String),

    #[error("unsupported input kind: {0}")]
    UnsupportedInputKind(String),

    #[error("verifying spire: {0}")]
    Verification(#[from] VerificationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
