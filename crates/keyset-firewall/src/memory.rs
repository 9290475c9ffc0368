//! In-memory policy firewall
//!
//! Holds policies and issued bearer tokens in memory. Suitable for
//! development, tests and single-instance deployments whose policies are
//! provisioned from a JSON document at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{info, warn};

use crate::error::{FirewallError, Result};
use crate::firewall::Firewall;
use crate::policy::{evaluate, pattern_matches, Policy};
use crate::types::{AccessRequest, TokenAccessRequest, TokenContext};

/// A bearer token known to the firewall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// Subject the token was issued to
    pub subject: String,

    /// Granted scopes, e.g. `hydra.keys.get` or `hydra.keys.*`
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Inactive tokens are rejected
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TokenGrant {
    pub fn new(subject: impl Into<String>, scopes: &[&str]) -> Self {
        Self {
            subject: subject.into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            active: true,
        }
    }

    /// Whether the grant covers a required scope
    ///
    /// A granted scope covers itself, any scope below it in the dot
    /// hierarchy (`hydra` covers `hydra.keys.get`) and, when ending in `*`,
    /// any scope sharing its prefix.
    pub fn has_scope(&self, required: &str) -> bool {
        self.scopes.iter().any(|granted| {
            pattern_matches(granted, required)
                || required
                    .strip_prefix(granted.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

/// Serialized firewall state: policies plus issued tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirewallDocument {
    #[serde(default)]
    pub policies: Vec<Policy>,

    /// Token value to grant
    #[serde(default)]
    pub tokens: HashMap<String, TokenGrant>,
}

/// In-memory firewall implementation
#[derive(Debug, Default)]
pub struct MemoryFirewall {
    policies: RwLock<Vec<Policy>>,
    tokens: RwLock<HashMap<String, TokenGrant>>,
}

impl MemoryFirewall {
    /// Create a firewall without policies; every check is denied
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a firewall from a document
    pub fn from_document(document: FirewallDocument) -> Self {
        info!(
            policies = document.policies.len(),
            tokens = document.tokens.len(),
            "Loaded firewall document"
        );

        Self {
            policies: RwLock::new(document.policies),
            tokens: RwLock::new(document.tokens),
        }
    }

    /// Parse a JSON firewall document
    pub fn from_json(json: &str) -> Result<Self> {
        let document: FirewallDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }

    /// Add a policy, replacing one with the same id
    pub fn add_policy(&self, policy: Policy) -> Result<()> {
        let mut policies = self.policies.write().map_err(poisoned)?;
        policies.retain(|p| p.id != policy.id);
        info!(policy = %policy.id, effect = ?policy.effect, "Added policy");
        policies.push(policy);
        Ok(())
    }

    /// Remove a policy by id
    pub fn remove_policy(&self, id: &str) -> Result<bool> {
        let mut policies = self.policies.write().map_err(poisoned)?;
        let before = policies.len();
        policies.retain(|p| p.id != id);
        Ok(policies.len() != before)
    }

    /// Register an issued token
    pub fn register_token(&self, token: impl Into<String>, grant: TokenGrant) -> Result<()> {
        let mut tokens = self.tokens.write().map_err(poisoned)?;
        info!(subject = %grant.subject, scopes = ?grant.scopes, "Registered token");
        tokens.insert(token.into(), grant);
        Ok(())
    }

    /// Mark a token inactive
    pub fn revoke_token(&self, token: &str) -> Result<bool> {
        let mut tokens = self.tokens.write().map_err(poisoned)?;
        Ok(match tokens.get_mut(token) {
            Some(grant) => {
                grant.active = false;
                info!(subject = %grant.subject, "Revoked token");
                true
            }
            None => false,
        })
    }

    fn introspect(&self, token: &str) -> Result<TokenGrant> {
        let tokens = self.tokens.read().map_err(poisoned)?;
        match tokens.get(token) {
            Some(grant) if grant.active => Ok(grant.clone()),
            Some(_) => Err(FirewallError::Unauthorized("token is inactive".into())),
            None => Err(FirewallError::Unauthorized("token is not known".into())),
        }
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> FirewallError {
    FirewallError::Engine("firewall state lock poisoned".into())
}

#[async_trait]
impl Firewall for MemoryFirewall {
    async fn token_allowed(
        &self,
        token: &str,
        request: &TokenAccessRequest,
        scope: &str,
    ) -> Result<TokenContext> {
        let grant = self.introspect(token)?;

        if !grant.has_scope(scope) {
            warn!(subject = %grant.subject, scope = %scope, "Token lacks scope");
            return Err(FirewallError::InsufficientScope(scope.to_string()));
        }

        let access = AccessRequest::new(&grant.subject, &request.resource, &request.action);
        self.is_allowed(&access).await?;

        Ok(TokenContext {
            subject: grant.subject,
            granted_scopes: grant.scopes,
        })
    }

    async fn is_allowed(&self, request: &AccessRequest) -> Result<()> {
        let policies = self.policies.read().map_err(poisoned)?;
        evaluate(&policies, request)
    }

    fn description(&self) -> &str {
        "in-memory policy firewall"
    }
}
