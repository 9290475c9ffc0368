//! Key-set service configuration

use crate::core::resource::{KeyAction, DEFAULT_RESOURCE_PREFIX};

/// Scope family required for token-bound checks (`hydra.keys.get`, ...)
pub const DEFAULT_SCOPE_PREFIX: &str = "hydra.keys";

/// Reserved set holding the ID token signing keys published by discovery
pub const ID_TOKEN_SET: &str = "hydra.openid.id-token";

/// Key-set service configuration
#[derive(Debug, Clone)]
pub struct KeysConfig {
    /// Policy resource prefix
    pub resource_prefix: String,
    /// Scope prefix; the action name is appended
    pub scope_prefix: String,
    /// Set served by the discovery endpoint
    pub well_known_set: String,
    /// Public base URL used for `Location` headers
    pub public_url: Option<String>,
    /// Reject single-key updates whose body kid differs from the path
    pub require_matching_kid: bool,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            resource_prefix: DEFAULT_RESOURCE_PREFIX.to_string(),
            scope_prefix: DEFAULT_SCOPE_PREFIX.to_string(),
            well_known_set: ID_TOKEN_SET.to_string(),
            public_url: None,
            require_matching_kid: false,
        }
    }
}

impl KeysConfig {
    /// Scope a token needs for an action
    pub fn scope(&self, action: KeyAction) -> String {
        format!("{}.{}", self.scope_prefix, action)
    }

    /// Location of a key set, from the public URL or the request host
    ///
    /// The set name is percent-encoded, so the result is always a valid
    /// header value.
    pub fn location(&self, host: Option<&str>, set: &str) -> String {
        let set = encode_path_segment(set);
        match (&self.public_url, host) {
            (Some(base), _) => format!("{}/keys/{}", base.trim_end_matches('/'), set),
            (None, Some(host)) => format!("http://{}/keys/{}", host, set),
            (None, None) => format!("/keys/{}", set),
        }
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set
fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
