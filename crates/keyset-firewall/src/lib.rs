//! Keyset Firewall
//!
//! Authorization for key-set resources.
//!
//! ## Architecture
//!
//! The [`Firewall`] trait is the policy decision engine. It checks either a
//! bearer token (resolving its subject and required scope) or an explicit
//! subject against policies keyed by resource identifier and action.
//!
//! - **AuthorizationGate**: runs the token check and falls back to the
//!   anonymous subject, so resources can be opened to the public by policy
//! - **MemoryFirewall**: in-memory policies and tokens, loadable from JSON
//!
//! ## Usage
//!
//! ```ignore
//! use keyset_firewall::{AuthorizationGate, MemoryFirewall, Policy};
//!
//! let firewall = MemoryFirewall::new();
//! firewall.add_policy(Policy::allow("jwks", &[""], &["rn:hydra:keys:*"], &["get"]))?;
//!
//! let gate = AuthorizationGate::new(Arc::new(firewall));
//! gate.check(None, "rn:hydra:keys:my-set:k1", "get", "hydra.keys.get").await?;
//! ```

pub mod error;
pub mod firewall;
pub mod gate;
pub mod memory;
pub mod policy;
pub mod types;

pub use error::{FirewallError, Result};
pub use firewall::Firewall;
pub use gate::{Access, AuthorizationGate};
pub use memory::{FirewallDocument, MemoryFirewall, TokenGrant};
pub use policy::{Effect, Policy};
pub use types::{bearer_token, AccessRequest, TokenAccessRequest, TokenContext, ANONYMOUS_SUBJECT};
