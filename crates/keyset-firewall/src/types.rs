//! Access request types exchanged with the policy engine

use serde::{Deserialize, Serialize};

/// Subject used for unauthenticated (public) access checks
pub const ANONYMOUS_SUBJECT: &str = "";

/// Access request for an explicit subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Subject requesting access, empty for anonymous
    pub subject: String,
    /// Policy resource identifier
    pub resource: String,
    /// Action name (get, create, update, delete)
    pub action: String,
}

impl AccessRequest {
    pub fn new(
        subject: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Access request for the anonymous subject
    pub fn anonymous(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(ANONYMOUS_SUBJECT, resource, action)
    }

    pub fn is_anonymous(&self) -> bool {
        self.subject == ANONYMOUS_SUBJECT
    }
}

/// Access request whose subject is resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccessRequest {
    /// Policy resource identifier
    pub resource: String,
    /// Action name
    pub action: String,
}

impl TokenAccessRequest {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }
}

/// Introspection result of an allowed token check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenContext {
    /// Subject the token was issued to
    pub subject: String,
    /// Scopes granted to the token
    pub granted_scopes: Vec<String>,
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
