//! Error types for key material handling

use thiserror::Error;

/// Result type alias using KeyError
pub type Result<T> = std::result::Result<T, KeyError>;

/// Errors that can occur while decoding, filtering or generating keys
#[derive(Error, Debug)]
pub enum KeyError {
    /// A single key representation failed to decode or validate
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    /// A key set cannot be processed as a whole
    #[error("Malformed key set: {0}")]
    MalformedKeySet(String),

    /// No generator is registered for the requested algorithm
    #[error("Generator {0} unknown")]
    UnknownAlgorithm(String),

    /// A generator could not produce key material
    #[error("Key generation failed: {0}")]
    GenerationFailed(String),
}

impl From<serde_json::Error> for KeyError {
    fn from(err: serde_json::Error) -> Self {
        KeyError::MalformedKey(err.to_string())
    }
}

impl From<rsa::Error> for KeyError {
    fn from(err: rsa::Error) -> Self {
        KeyError::GenerationFailed(err.to_string())
    }
}
