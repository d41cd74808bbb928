//! Error types for member registration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Failures of the photo preview step.
#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Unreadable file '{name}': {source}")]
    UnreadableFile {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures talking to the persistence backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend rejected request ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    InFlight,

    #[error("Registration has already been submitted")]
    AlreadySubmitted,
}
