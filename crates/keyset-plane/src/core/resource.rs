//! Policy resource naming
//!
//! Every resource handed to the authorization gate is built here so that
//! identifiers are consistent across operations:
//! `<prefix>:keys:<set>` and `<prefix>:keys:<set>:<kid>`.

use std::fmt;

/// Prefix used when none is configured
pub const DEFAULT_RESOURCE_PREFIX: &str = "rn:hydra";

/// Action names checked against policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Get,
    Create,
    Update,
    Delete,
}

impl KeyAction {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyAction::Get => "get",
            KeyAction::Create => "create",
            KeyAction::Update => "update",
            KeyAction::Delete => "delete",
        }
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds prefixed policy resource identifiers
///
/// The prefix is normalized once at construction and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNamer {
    prefix: String,
}

impl ResourceNamer {
    /// Create a namer; an empty prefix defaults to `rn:hydra` and one
    /// trailing colon is stripped
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if prefix.is_empty() {
            prefix = DEFAULT_RESOURCE_PREFIX.to_string();
        }
        if prefix.ends_with(':') {
            prefix.pop();
        }
        Self { prefix }
    }

    /// The normalized prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<prefix>:<suffix>`
    pub fn prefix_resource(&self, suffix: &str) -> String {
        format!("{}:{}", self.prefix, suffix)
    }

    /// Resource of a whole key set
    pub fn key_set(&self, set: &str) -> String {
        self.prefix_resource(&format!("keys:{}", set))
    }

    /// Resource of a single key within a set
    pub fn key(&self, set: &str, kid: &str) -> String {
        self.prefix_resource(&format!("keys:{}:{}", set, kid))
    }
}

impl Default for ResourceNamer {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_prefix() {
        let namer = ResourceNamer::new("");
        assert_eq!(namer.prefix(), "rn:hydra");
        assert_eq!(namer.key_set("my-set"), "rn:hydra:keys:my-set");
        assert_eq!(namer.key("my-set", "k1"), "rn:hydra:keys:my-set:k1");
    }

    #[test]
    fn test_trailing_colon_stripped_once() {
        assert_eq!(ResourceNamer::new("rn:acme:").prefix(), "rn:acme");
        assert_eq!(ResourceNamer::new("rn:acme::").prefix(), "rn:acme:");
    }

    #[test]
    fn test_tagged_key_resource() {
        let namer = ResourceNamer::default();
        assert_eq!(
            namer.key("hydra.openid.id-token", "public:"),
            "rn:hydra:keys:hydra.openid.id-token:public:"
        );
    }

    proptest! {
        #[test]
        fn prop_naming_is_idempotent(prefix in "[a-z]{1,6}(:[a-z]{1,6}){0,2}", suffix in "[a-z0-9:.-]{0,20}") {
            let plain = ResourceNamer::new(prefix.clone());
            let with_colon = ResourceNamer::new(format!("{}:", prefix));

            prop_assert_eq!(&ResourceNamer::new(plain.prefix()), &plain);
            prop_assert_eq!(plain.prefix_resource(&suffix), with_colon.prefix_resource(&suffix));
            prop_assert_eq!(plain.prefix_resource(&suffix), format!("{}:{}", prefix, suffix));
        }
    }
}
