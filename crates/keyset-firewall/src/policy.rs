//! Access policies
//!
//! A policy grants (or denies) a list of subjects a list of actions on a list
//! of resources. Patterns match exactly or, when ending in `*`, by prefix.
//! An explicit deny always wins over any allow; no matching policy means deny.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FirewallError, Result};
use crate::types::AccessRequest;

/// Policy effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    Deny,
}

/// A single access policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy identifier
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Subject patterns; `""` addresses the anonymous subject
    pub subjects: Vec<String>,

    /// Resource patterns, e.g. `rn:hydra:keys:my-set:*`
    pub resources: Vec<String>,

    /// Action patterns, e.g. `get`
    pub actions: Vec<String>,

    pub effect: Effect,
}

impl Policy {
    /// Allow policy
    pub fn allow(
        id: impl Into<String>,
        subjects: &[&str],
        resources: &[&str],
        actions: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            subjects: to_strings(subjects),
            resources: to_strings(resources),
            actions: to_strings(actions),
            effect: Effect::Allow,
        }
    }

    /// Deny policy
    pub fn deny(
        id: impl Into<String>,
        subjects: &[&str],
        resources: &[&str],
        actions: &[&str],
    ) -> Self {
        Self {
            effect: Effect::Deny,
            ..Self::allow(id, subjects, resources, actions)
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether this policy applies to the request
    pub fn matches(&self, request: &AccessRequest) -> bool {
        any_matches(&self.subjects, &request.subject)
            && any_matches(&self.resources, &request.resource)
            && any_matches(&self.actions, &request.action)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn any_matches(patterns: &[String], value: &str) -> bool {
    patterns.iter().any(|pattern| pattern_matches(pattern, value))
}

/// Check a value against a pattern (exact, or prefix when ending in `*`)
pub fn pattern_matches(pattern: &str, value: &str) -> bool {
    if pattern == value {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return value.starts_with(prefix);
    }

    false
}

/// Evaluate a request against a list of policies
pub fn evaluate(policies: &[Policy], request: &AccessRequest) -> Result<()> {
    let mut allowed_by = None;

    for policy in policies.iter().filter(|p| p.matches(request)) {
        match policy.effect {
            Effect::Deny => {
                debug!(policy = %policy.id, resource = %request.resource, "Explicit deny");
                return Err(FirewallError::Forbidden(format!(
                    "access to '{}' explicitly denied by policy '{}'",
                    request.resource, policy.id
                )));
            }
            Effect::Allow if allowed_by.is_none() => allowed_by = Some(&policy.id),
            Effect::Allow => {}
        }
    }

    match allowed_by {
        Some(id) => {
            debug!(policy = %id, resource = %request.resource, "Access allowed");
            Ok(())
        }
        None => Err(FirewallError::Forbidden(format!(
            "no policy allows '{}' to {} '{}'",
            display_subject(&request.subject),
            request.action,
            request.resource
        ))),
    }
}

fn display_subject(subject: &str) -> &str {
    if subject.is_empty() {
        "anonymous"
    } else {
        subject
    }
}
