//! Property-Based Tests for key-set handling
//!
//! Verifies for arbitrary sets:
//! 1. The public-key filter returns exactly the prefixed keys, in order
//! 2. Merging keeps one key per id and incoming keys win
//!
//! Uses proptest for property-based testing with arbitrary inputs.

use keyset_core::{find_keys_by_prefix, Jwk, KeySet, PUBLIC_PREFIX};
use proptest::prelude::*;

fn oct(kid: &str, secret: &str) -> Jwk {
    Jwk::new(kid, "oct").with_bytes("k", secret.as_bytes())
}

fn kid_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9]{1,8}".prop_map(|id| format!("public:{}", id)),
        "[a-z0-9]{1,8}".prop_map(|id| format!("private:{}", id)),
        "[a-z0-9]{1,8}",
    ]
}

// =============================================================================
// Public-key filter
// =============================================================================

proptest! {
    #[test]
    fn prop_filter_keeps_only_public_keys_in_order(
        kids in prop::collection::vec(kid_strategy(), 0..20),
    ) {
        let set = KeySet::from_keys(kids.iter().map(|kid| oct(kid, "s")).collect());

        let public = find_keys_by_prefix(&set, PUBLIC_PREFIX).unwrap();

        let expected: Vec<&str> = kids
            .iter()
            .map(String::as_str)
            .filter(|kid| kid.starts_with(PUBLIC_PREFIX))
            .collect();
        prop_assert_eq!(public.kids(), expected);
        prop_assert_eq!(set.len(), kids.len());
    }
}

// =============================================================================
// Merge semantics
// =============================================================================

proptest! {
    #[test]
    fn prop_merge_incoming_keys_win(
        existing in prop::collection::vec("[a-e]", 0..6),
        incoming in prop::collection::vec("[a-h]", 0..6),
    ) {
        let mut set = KeySet::new();
        for kid in &existing {
            set.upsert(oct(kid, "old"));
        }
        let mut update = KeySet::new();
        for kid in &incoming {
            update.upsert(oct(kid, "new"));
        }

        set.merge(update);

        for kid in &incoming {
            prop_assert_eq!(set.key(kid).unwrap(), &oct(kid, "new"));
        }
        for kid in existing.iter().filter(|kid| !incoming.contains(*kid)) {
            prop_assert_eq!(set.key(kid).unwrap(), &oct(kid, "old"));
        }

        let mut kids = set.kids();
        let total = kids.len();
        kids.sort_unstable();
        kids.dedup();
        prop_assert_eq!(kids.len(), total);
    }
}
