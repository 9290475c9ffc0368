//! Error types for the policy firewall

use thiserror::Error;

/// Result type for firewall operations
pub type Result<T> = std::result::Result<T, FirewallError>;

/// Errors surfaced by access checks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FirewallError {
    /// The bearer token is unknown, inactive or missing
    #[error("Request could not be authenticated: {0}")]
    Unauthorized(String),

    /// The token does not carry the scope the operation requires
    #[error("Token lacks required scope: {0}")]
    InsufficientScope(String),

    /// Policies do not allow the subject to perform the action
    #[error("Request forbidden: {0}")]
    Forbidden(String),

    /// The policy engine itself failed
    #[error("Policy engine error: {0}")]
    Engine(String),
}

impl From<serde_json::Error> for FirewallError {
    fn from(err: serde_json::Error) -> Self {
        FirewallError::Engine(format!("invalid policy document: {}", err))
    }
}
