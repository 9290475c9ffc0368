//! Public-key filtering
//!
//! Generated asymmetric pairs are stored as `public:<kid>` and
//! `private:<kid>`. Discovery endpoints publish only the keys tagged with the
//! public prefix so private and symmetric material never leaves the store.

use crate::error::{KeyError, Result};
use crate::jwk::KeySet;

/// Prefix tagging verification-only keys
pub const PUBLIC_PREFIX: &str = "public";

/// Prefix tagging private halves of generated pairs
pub const PRIVATE_PREFIX: &str = "private";

/// Build a tagged key id such as `public:k1`
pub fn tagged_kid(prefix: &str, kid: &str) -> String {
    format!("{}:{}", prefix, kid)
}

/// Return a new key set holding only the keys whose id starts with `prefix`
///
/// The input set is left untouched. A key without an id cannot be classified,
/// so its presence fails the whole call rather than being dropped silently.
pub fn find_keys_by_prefix(set: &KeySet, prefix: &str) -> Result<KeySet> {
    let mut filtered = KeySet::new();

    for key in &set.keys {
        if key.kid.is_empty() {
            return Err(KeyError::MalformedKeySet(
                "key set contains a key without a kid".into(),
            ));
        }

        if key.kid.starts_with(prefix) {
            filtered.keys.push(key.clone());
        }
    }

    Ok(filtered)
}
