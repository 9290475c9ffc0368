//! Key generators and the generator registry
//!
//! Every generator turns a requested key id into a complete [`KeySet`]:
//! - `RS256`: RSA pair stored as `public:<kid>` / `private:<kid>`
//! - `ES512`: P-521 ECDSA pair stored as `public:<kid>` / `private:<kid>`
//! - `HS256` / `HS512`: one symmetric `oct` key stored under `<kid>`
//!
//! The registry is built once at startup and never mutated afterwards.

use p521::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::RsaPrivateKey;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{KeyError, Result};
use crate::filter::{tagged_kid, PRIVATE_PREFIX, PUBLIC_PREFIX};
use crate::jwk::{Jwk, KeySet};

/// Use tag of every generated key
const SIGNATURE_USE: &str = "sig";

/// Default RSA modulus size
pub const DEFAULT_RSA_BITS: usize = 4096;

/// A capability producing fresh key material for one algorithm
pub trait KeyGenerator: Send + Sync {
    /// Algorithm name this generator is registered under
    fn algorithm(&self) -> &'static str;

    /// Generate a new key set for the requested key id
    fn generate(&self, kid: &str) -> Result<KeySet>;
}

/// RS256 generator
#[derive(Debug, Clone)]
pub struct Rs256Generator {
    bits: usize,
}

impl Rs256Generator {
    pub fn new() -> Self {
        Self::with_bits(DEFAULT_RSA_BITS)
    }

    /// Generator with a custom modulus size
    pub fn with_bits(bits: usize) -> Self {
        Self { bits }
    }
}

impl Default for Rs256Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator for Rs256Generator {
    fn algorithm(&self) -> &'static str {
        "RS256"
    }

    fn generate(&self, kid: &str) -> Result<KeySet> {
        let private = RsaPrivateKey::new(&mut OsRng, self.bits)?;

        let public_jwk = Jwk::new(tagged_kid(PUBLIC_PREFIX, kid), "RSA")
            .with_alg(self.algorithm())
            .with_use(SIGNATURE_USE)
            .with_bytes("n", &private.n().to_bytes_be())
            .with_bytes("e", &private.e().to_bytes_be());

        let primes = private.primes();
        if primes.len() != 2 {
            return Err(KeyError::GenerationFailed(format!(
                "expected two RSA primes, got {}",
                primes.len()
            )));
        }

        let missing = || KeyError::GenerationFailed("RSA CRT values missing".into());
        let dp = private.dp().ok_or_else(missing)?;
        let dq = private.dq().ok_or_else(missing)?;
        let qi = private.crt_coefficient().ok_or_else(missing)?;

        let mut private_jwk = public_jwk
            .clone()
            .with_bytes("d", &private.d().to_bytes_be())
            .with_bytes("p", &primes[0].to_bytes_be())
            .with_bytes("q", &primes[1].to_bytes_be())
            .with_bytes("dp", &dp.to_bytes_be())
            .with_bytes("dq", &dq.to_bytes_be())
            .with_bytes("qi", &qi.to_bytes_be());
        private_jwk.kid = tagged_kid(PRIVATE_PREFIX, kid);

        debug!(kid = %kid, bits = self.bits, "Generated RSA key pair");

        Ok(KeySet::from_keys(vec![private_jwk, public_jwk]))
    }
}

/// ES512 generator (ECDSA over P-521)
#[derive(Debug, Clone, Default)]
pub struct Es512Generator;

impl KeyGenerator for Es512Generator {
    fn algorithm(&self) -> &'static str {
        "ES512"
    }

    fn generate(&self, kid: &str) -> Result<KeySet> {
        let secret = p521::SecretKey::random(&mut OsRng);
        let point = secret.public_key().to_encoded_point(false);

        let (x, y) = match (point.x(), point.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(KeyError::GenerationFailed(
                    "P-521 public key has no affine coordinates".into(),
                ))
            }
        };

        let public_jwk = Jwk::new(tagged_kid(PUBLIC_PREFIX, kid), "EC")
            .with_alg(self.algorithm())
            .with_use(SIGNATURE_USE)
            .with_param("crv", "P-521")
            .with_bytes("x", x)
            .with_bytes("y", y);

        let mut private_jwk = public_jwk.clone().with_bytes("d", &secret.to_bytes());
        private_jwk.kid = tagged_kid(PRIVATE_PREFIX, kid);

        debug!(kid = %kid, "Generated P-521 key pair");

        Ok(KeySet::from_keys(vec![private_jwk, public_jwk]))
    }
}

/// HMAC secret generator (HS256, HS512)
#[derive(Debug, Clone)]
pub struct HmacGenerator {
    algorithm: &'static str,
    secret_len: usize,
}

impl HmacGenerator {
    /// 256-bit secret for HS256
    pub fn hs256() -> Self {
        Self {
            algorithm: "HS256",
            secret_len: 32,
        }
    }

    /// 512-bit secret for HS512
    pub fn hs512() -> Self {
        Self {
            algorithm: "HS512",
            secret_len: 64,
        }
    }
}

impl KeyGenerator for HmacGenerator {
    fn algorithm(&self) -> &'static str {
        self.algorithm
    }

    fn generate(&self, kid: &str) -> Result<KeySet> {
        let mut secret = vec![0u8; self.secret_len];
        OsRng.fill_bytes(&mut secret);

        let key = Jwk::new(kid, "oct")
            .with_alg(self.algorithm)
            .with_use(SIGNATURE_USE)
            .with_bytes("k", &secret);

        Ok(KeySet::from_keys(vec![key]))
    }
}

/// Algorithm name to generator mapping
#[derive(Clone)]
pub struct GeneratorRegistry {
    generators: HashMap<String, Arc<dyn KeyGenerator>>,
}

impl GeneratorRegistry {
    /// Registry holding the built-in generators (RS256, ES512, HS256, HS512)
    pub fn new() -> Self {
        Self::empty()
            .with_generator(Rs256Generator::new())
            .with_generator(Es512Generator)
            .with_generator(HmacGenerator::hs256())
            .with_generator(HmacGenerator::hs512())
    }

    /// Registry without any generator
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Registry built from an explicit override mapping
    ///
    /// An empty override falls back to the built-in generators.
    pub fn from_generators(generators: Vec<Arc<dyn KeyGenerator>>) -> Self {
        if generators.is_empty() {
            return Self::new();
        }

        let mut registry = Self::empty();
        for generator in generators {
            registry
                .generators
                .insert(generator.algorithm().to_string(), generator);
        }
        registry
    }

    /// Add or replace a generator
    pub fn with_generator<G: KeyGenerator + 'static>(mut self, generator: G) -> Self {
        self.generators
            .insert(generator.algorithm().to_string(), Arc::new(generator));
        self
    }

    /// Look up a generator by exact, case-sensitive algorithm name
    pub fn get(&self, algorithm: &str) -> Option<Arc<dyn KeyGenerator>> {
        self.generators.get(algorithm).cloned()
    }

    /// Look up a generator, failing with `UnknownAlgorithm` on a miss
    pub fn require(&self, algorithm: &str) -> Result<Arc<dyn KeyGenerator>> {
        self.get(algorithm)
            .ok_or_else(|| KeyError::UnknownAlgorithm(algorithm.to_string()))
    }

    /// Registered algorithm names, sorted
    pub fn algorithms(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("algorithms", &self.algorithms())
            .finish()
    }
}
