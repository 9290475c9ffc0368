//! # Keyset Core
//!
//! Key material types and primitives shared by the key-set service.
//!
//! ## Key Concepts
//!
//! - **Jwk**: one JSON Web Key, identified by its `kid` within a set
//! - **KeySet**: an ordered, named group of keys stored and served as a unit
//! - **KeyGenerator**: produces a fresh key set for one algorithm
//! - **Public-key filter**: selects the `public:` keys safe to publish

pub mod error;
pub mod filter;
pub mod generator;
pub mod jwk;

pub use error::{KeyError, Result};
pub use filter::{find_keys_by_prefix, tagged_kid, PRIVATE_PREFIX, PUBLIC_PREFIX};
pub use generator::{
    Es512Generator, GeneratorRegistry, HmacGenerator, KeyGenerator, Rs256Generator,
    DEFAULT_RSA_BITS,
};
pub use jwk::{Jwk, KeySet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
