pub mod commands;
pub mod handlers;
use crate::error::Error;

// Re-export commonly used items
pub use commands::Commands;
pub use handlers::handle_command;

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CLI_NAME: &str = "chains-attest";

pub fn format_error(error: &Error) -> String {
    match error {
        Error::Io(err) => format!("IO error: {err}"),
        Error::Validation(msg) => format!("Validation error: {msg}"),
        Error::Signing(msg) => format!("Signing error: {msg}"),
        Error::Serialization(msg) => format!("Serialization error: {msg}"),
        Error::InitializationError(msg) => format!("Initialization error: {msg}"),
        Error::UnsupportedInputKind(kind) => format!("Unsupported input: {kind}"),
        Error::Verification(err) => format!("Verification failed: {err}"),
        Error::Json(err) => format!("JSON error: {err}"),
        Error::Yaml(err) => format!("YAML error: {err}"),
    }
}
