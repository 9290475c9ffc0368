//! Firewall trait
//!
//! The policy decision engine consulted by the authorization gate. It answers
//! two questions: may the subject behind a bearer token perform an action on
//! a resource, and may an explicit subject (possibly anonymous) do so.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AccessRequest, TokenAccessRequest, TokenContext};

/// Policy decision engine
#[async_trait]
pub trait Firewall: Send + Sync {
    /// Check a token-bound request
    ///
    /// # Arguments
    /// * `token` - The raw bearer token
    /// * `request` - Resource and action to check
    /// * `scope` - Scope the token must have been granted
    ///
    /// # Returns
    /// * `Ok(TokenContext)` - The token is valid, scoped and allowed
    /// * `Err(FirewallError)` - Any of those checks failed
    async fn token_allowed(
        &self,
        token: &str,
        request: &TokenAccessRequest,
        scope: &str,
    ) -> Result<TokenContext>;

    /// Check a request for an explicit subject
    async fn is_allowed(&self, request: &AccessRequest) -> Result<()>;

    /// Get a description of this firewall (for logging)
    fn description(&self) -> &str {
        "policy firewall"
    }
}
