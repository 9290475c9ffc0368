//! Two-tier authorization gate
//!
//! Every resource is checked in two steps:
//! 1. If the request carries a bearer token, the token-bound check decides.
//! 2. Otherwise, or when that check fails, the anonymous subject is checked,
//!    so administrators can open individual resources to the public.
//!
//! When both fail the anonymous check's error is surfaced unchanged.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::firewall::Firewall;
use crate::types::{AccessRequest, TokenAccessRequest, TokenContext};

/// Outcome of an allowed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Allowed for the subject behind the bearer token
    Subject(TokenContext),
    /// Allowed through a policy for the anonymous subject
    Anonymous,
}

/// Authorization gate in front of every key-set operation
#[derive(Clone)]
pub struct AuthorizationGate {
    firewall: Arc<dyn Firewall>,
}

impl AuthorizationGate {
    pub fn new(firewall: Arc<dyn Firewall>) -> Self {
        Self { firewall }
    }

    /// Check one resource
    ///
    /// # Arguments
    /// * `token` - Bearer token bound to the request, if any
    /// * `resource` - Fully prefixed policy resource identifier
    /// * `action` - Action name
    /// * `scope` - Scope required for the token-bound check
    pub async fn check(
        &self,
        token: Option<&str>,
        resource: &str,
        action: &str,
        scope: &str,
    ) -> Result<Access> {
        if let Some(token) = token {
            let request = TokenAccessRequest::new(resource, action);
            match self.firewall.token_allowed(token, &request, scope).await {
                Ok(context) => {
                    debug!(subject = %context.subject, resource = %resource, action = %action, "Token access allowed");
                    return Ok(Access::Subject(context));
                }
                Err(e) => {
                    debug!(resource = %resource, action = %action, error = %e, "Token check failed, trying anonymous policy");
                }
            }
        }

        let request = AccessRequest::anonymous(resource, action);
        match self.firewall.is_allowed(&request).await {
            Ok(()) => {
                debug!(resource = %resource, action = %action, "Anonymous access allowed");
                Ok(Access::Anonymous)
            }
            Err(e) => {
                warn!(resource = %resource, action = %action, error = %e, "Access denied");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("firewall", &self.firewall.description())
            .finish()
    }
}
