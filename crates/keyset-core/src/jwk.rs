//! JSON Web Key and JSON Web Key Set types
//!
//! A [`Jwk`] keeps the members every key shares (`kid`, `kty`, `alg`, `use`)
//! as typed fields and carries the algorithm-specific material verbatim, so
//! keys supplied by clients survive a store round-trip unchanged.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{KeyError, Result};

/// A single JSON Web Key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key identifier, unique within its set
    #[serde(default)]
    pub kid: String,

    /// Key type (RSA, EC, oct, OKP)
    pub kty: String,

    /// Intended algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Public key use ("sig" or "enc")
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    /// Algorithm-specific members (n, e, d, crv, x, y, k, ...)
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Jwk {
    /// Create a key with the given id and key type and no material
    pub fn new(kid: impl Into<String>, kty: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            kty: kty.into(),
            alg: None,
            key_use: None,
            params: Map::new(),
        }
    }

    /// Set the algorithm
    pub fn with_alg(mut self, alg: impl Into<String>) -> Self {
        self.alg = Some(alg.into());
        self
    }

    /// Set the use tag
    pub fn with_use(mut self, key_use: impl Into<String>) -> Self {
        self.key_use = Some(key_use.into());
        self
    }

    /// Add a string member as-is (e.g. `crv`)
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), Value::String(value.into()));
        self
    }

    /// Add a binary member, base64url-encoded without padding
    pub fn with_bytes(self, name: &str, bytes: &[u8]) -> Self {
        let encoded = URL_SAFE_NO_PAD.encode(bytes);
        self.with_param(name, encoded)
    }

    /// Look up a string member
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    /// Decode a base64url member
    pub fn param_bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.param(name)
            .and_then(|value| URL_SAFE_NO_PAD.decode(value).ok())
    }

    /// Decode and validate a key from a raw JSON value
    pub fn from_value(raw: Value) -> Result<Self> {
        let key: Jwk = serde_json::from_value(raw)?;
        key.validate()?;
        Ok(key)
    }

    /// Decode and validate a key from JSON bytes
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let key: Jwk = serde_json::from_slice(raw)?;
        key.validate()?;
        Ok(key)
    }

    /// Check that the key is addressable and carries the members its type needs
    pub fn validate(&self) -> Result<()> {
        if self.kid.is_empty() {
            return Err(KeyError::MalformedKey("key is missing a kid".into()));
        }

        let required: &[&str] = match self.kty.as_str() {
            "RSA" => &["n", "e"],
            "EC" => &["crv", "x", "y"],
            "oct" => &["k"],
            "OKP" => &["crv", "x"],
            other => {
                return Err(KeyError::MalformedKey(format!(
                    "key '{}' has unsupported kty '{}'",
                    self.kid, other
                )))
            }
        };

        for member in required {
            let value = self.param(member).ok_or_else(|| {
                KeyError::MalformedKey(format!(
                    "key '{}' of type {} is missing member '{}'",
                    self.kid, self.kty, member
                ))
            })?;

            // crv is a name, everything else is base64url material
            if *member != "crv" && URL_SAFE_NO_PAD.decode(value).is_err() {
                return Err(KeyError::MalformedKey(format!(
                    "key '{}' member '{}' is not base64url",
                    self.kid, member
                )));
            }
        }

        Ok(())
    }
}

/// An ordered set of JSON Web Keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeySet {
    pub keys: Vec<Jwk>,
}

impl KeySet {
    /// Create an empty key set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a key set from keys, keeping their order
    pub fn from_keys(keys: Vec<Jwk>) -> Self {
        Self { keys }
    }

    /// Find a key by id
    pub fn key(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    /// Key ids in set order
    pub fn kids(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.kid.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Insert a key, replacing one with the same id in place or appending it
    pub fn upsert(&mut self, key: Jwk) {
        match self.keys.iter_mut().find(|k| k.kid == key.kid) {
            Some(existing) => *existing = key,
            None => self.keys.push(key),
        }
    }

    /// Merge another set into this one; incoming keys win on id collision
    pub fn merge(&mut self, other: KeySet) {
        for key in other.keys {
            self.upsert(key);
        }
    }

    /// Remove a key by id, returning it if present
    pub fn remove(&mut self, kid: &str) -> Option<Jwk> {
        let index = self.keys.iter().position(|k| k.kid == kid)?;
        Some(self.keys.remove(index))
    }

    /// Decode and validate raw key representations into a set
    ///
    /// Duplicate ids are rejected since a set cannot hold two keys with the
    /// same id.
    pub fn from_values(raw: Vec<Value>) -> Result<Self> {
        let mut set = KeySet::new();
        for value in raw {
            let key = Jwk::from_value(value)?;
            if set.key(&key.kid).is_some() {
                return Err(KeyError::MalformedKeySet(format!(
                    "duplicate kid '{}'",
                    key.kid
                )));
            }
            set.keys.push(key);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn oct(kid: &str) -> Jwk {
        Jwk::new(kid, "oct").with_alg("HS256").with_bytes("k", b"secret")
    }

    #[test]
    fn test_unknown_members_survive_roundtrip() {
        let raw = json!({
            "kid": "rsa-1",
            "kty": "RSA",
            "alg": "RS256",
            "use": "sig",
            "n": "sXchDaQebHnPiGvyDOAT4saG",
            "e": "AQAB",
            "x5t": "thumbprint"
        });

        let key = Jwk::from_value(raw.clone()).unwrap();
        assert_eq!(key.key_use.as_deref(), Some("sig"));
        assert_eq!(key.param("x5t"), Some("thumbprint"));
        assert_eq!(serde_json::to_value(&key).unwrap(), raw);
    }

    #[test]
    fn test_missing_kid_rejected() {
        let result = Jwk::from_value(json!({"kty": "oct", "k": "c2VjcmV0"}));
        assert!(matches!(result, Err(KeyError::MalformedKey(_))));
    }

    #[test]
    fn test_missing_material_rejected() {
        let result = Jwk::from_value(json!({"kid": "ec", "kty": "EC", "crv": "P-521", "x": "AA"}));
        assert!(matches!(result, Err(KeyError::MalformedKey(msg)) if msg.contains("'y'")));
    }

    #[test]
    fn test_unsupported_kty_rejected() {
        let result = Jwk::from_value(json!({"kid": "x", "kty": "DSA"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let result = Jwk::from_value(json!({"kid": "x", "kty": "oct", "k": "not base64!"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut set = KeySet::from_keys(vec![oct("a"), oct("b"), oct("c")]);
        set.upsert(oct("b").with_use("enc"));
        set.upsert(oct("d"));

        assert_eq!(set.kids(), vec!["a", "b", "c", "d"]);
        assert_eq!(set.key("b").unwrap().key_use.as_deref(), Some("enc"));
    }

    #[test]
    fn test_remove() {
        let mut set = KeySet::from_keys(vec![oct("a"), oct("b")]);
        assert!(set.remove("a").is_some());
        assert!(set.remove("a").is_none());
        assert_eq!(set.kids(), vec!["b"]);
    }

    #[test]
    fn test_from_values_rejects_duplicates() {
        let raw = vec![
            serde_json::to_value(oct("a")).unwrap(),
            serde_json::to_value(oct("a")).unwrap(),
        ];
        assert!(matches!(KeySet::from_values(raw), Err(KeyError::MalformedKeySet(_))));
    }

    #[test]
    fn test_from_values_keeps_order() {
        let raw = ["z", "a", "m"]
            .iter()
            .map(|kid| serde_json::to_value(oct(kid)).unwrap())
            .collect();
        let set = KeySet::from_values(raw).unwrap();
        assert_eq!(set.kids(), vec!["z", "a", "m"]);
    }
}
