//! Key Set Lifecycle
//!
//! The operations behind every key endpoint. Each one builds its policy
//! resources through the [`ResourceNamer`], passes them through the
//! [`AuthorizationGate`] and only then touches the store or a generator.
//!
//! Operations that cover several keys (fetching a set, discovery) check every
//! key in set order and abort on the first denial: a caller allowed on only
//! some keys of a set gets that denial, never a partial set.

use keyset_core::{find_keys_by_prefix, tagged_kid, GeneratorRegistry, Jwk, KeySet, PUBLIC_PREFIX};
use keyset_firewall::{Access, AuthorizationGate};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::core::{KeyAction, KeysConfig, ResourceNamer};
use crate::storage::{KeyManager, StorageError};

/// Body of `POST /keys/{set}`
#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    /// Generator algorithm ("RS256", "ES512", "HS256", "HS512")
    pub alg: String,

    /// Requested key id
    #[serde(default)]
    pub kid: String,
}

/// Body of `PUT /keys/{set}`
#[derive(Debug, Deserialize)]
pub struct ReplaceKeySetRequest {
    /// Raw key representations, validated one by one
    pub keys: Vec<Value>,
}

/// Policy-gated key-set operations
#[derive(Debug, Clone)]
pub struct KeySetService {
    store: Arc<dyn KeyManager>,
    gate: AuthorizationGate,
    generators: Arc<GeneratorRegistry>,
    namer: ResourceNamer,
    config: KeysConfig,
}

impl KeySetService {
    /// Create the service; the resource prefix is normalized here, once
    pub fn new(
        store: Arc<dyn KeyManager>,
        gate: AuthorizationGate,
        generators: GeneratorRegistry,
        config: KeysConfig,
    ) -> Self {
        let namer = ResourceNamer::new(config.resource_prefix.clone());
        info!(
            prefix = %namer.prefix(),
            algorithms = ?generators.algorithms(),
            "Key set service initialized"
        );

        Self {
            store,
            gate,
            generators: Arc::new(generators),
            namer,
            config,
        }
    }

    pub fn config(&self) -> &KeysConfig {
        &self.config
    }

    pub fn namer(&self) -> &ResourceNamer {
        &self.namer
    }

    async fn authorize(
        &self,
        token: Option<&str>,
        resource: &str,
        action: KeyAction,
    ) -> Result<Access, ApiError> {
        let scope = self.config.scope(action);
        let access = self
            .gate
            .check(token, resource, action.as_str(), &scope)
            .await?;
        Ok(access)
    }

    /// Check every key of a set in order, stopping at the first denial
    async fn authorize_each(
        &self,
        token: Option<&str>,
        set: &str,
        keys: &KeySet,
        action: KeyAction,
    ) -> Result<(), ApiError> {
        for key in &keys.keys {
            self.authorize(token, &self.namer.key(set, &key.kid), action)
                .await?;
        }
        Ok(())
    }

    // =========================================================================
    // Read operations
    // =========================================================================

    /// Public keys of the well-known ID token set
    ///
    /// A failed fetch is only reported to callers allowed on the set's public
    /// resource; everyone else sees the denial.
    pub async fn well_known(&self, token: Option<&str>) -> Result<KeySet, ApiError> {
        let set = self.config.well_known_set.as_str();

        let keys = match self.store.get_key_set(set).await {
            Ok(keys) => keys,
            Err(err) => {
                let resource = self.namer.key(set, &tagged_kid(PUBLIC_PREFIX, ""));
                self.authorize(token, &resource, KeyAction::Get).await?;
                return Err(err.into());
            }
        };

        // A stored set that cannot be filtered is a server-side fault
        let public = find_keys_by_prefix(&keys, PUBLIC_PREFIX)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        self.authorize_each(token, set, &public, KeyAction::Get)
            .await?;

        Ok(public)
    }

    /// Single key of a set
    pub async fn get_key(
        &self,
        token: Option<&str>,
        set: &str,
        kid: &str,
    ) -> Result<KeySet, ApiError> {
        self.authorize(token, &self.namer.key(set, kid), KeyAction::Get)
            .await?;

        Ok(self.store.get_key(set, kid).await?)
    }

    /// All keys of a set; every key must be readable
    pub async fn get_key_set(&self, token: Option<&str>, set: &str) -> Result<KeySet, ApiError> {
        let keys = self.store.get_key_set(set).await?;

        self.authorize_each(token, set, &keys, KeyAction::Get)
            .await?;

        Ok(keys)
    }

    // =========================================================================
    // Write operations
    // =========================================================================

    /// Generate a key set and merge it into `set`
    pub async fn create(
        &self,
        token: Option<&str>,
        set: &str,
        body: &[u8],
    ) -> Result<KeySet, ApiError> {
        self.authorize(token, &self.namer.key_set(set), KeyAction::Create)
            .await?;

        let request: CreateKeyRequest = serde_json::from_slice(body)?;
        let generator = self.generators.require(&request.alg)?;

        if request.kid.is_empty() {
            return Err(ApiError::MalformedInput("kid must not be empty".into()));
        }

        let kid = request.kid.clone();
        let keys = tokio::task::spawn_blocking(move || generator.generate(&kid))
            .await
            .map_err(|e| ApiError::GenerationFailure(format!("generator task failed: {}", e)))??;

        self.store.add_key_set(set, &keys).await?;

        info!(set = %set, alg = %request.alg, kids = ?keys.kids(), "Generated key set");

        Ok(keys)
    }

    /// Merge client-supplied keys into `set`
    pub async fn update_key_set(
        &self,
        token: Option<&str>,
        set: &str,
        body: &[u8],
    ) -> Result<KeySet, ApiError> {
        self.authorize(token, &self.namer.key_set(set), KeyAction::Update)
            .await?;

        let request: ReplaceKeySetRequest = serde_json::from_slice(body)?;
        let keys = KeySet::from_values(request.keys)?;

        self.store.add_key_set(set, &keys).await?;

        info!(set = %set, kids = ?keys.kids(), "Updated key set");

        Ok(keys)
    }

    /// Merge one client-supplied key into `set`
    ///
    /// The kid embedded in the body, not the one in the path, names the
    /// resource that is checked and written.
    pub async fn update_key(
        &self,
        token: Option<&str>,
        set: &str,
        path_kid: &str,
        body: &[u8],
    ) -> Result<Jwk, ApiError> {
        let key = Jwk::from_slice(body)?;

        if key.kid != path_kid {
            if self.config.require_matching_kid {
                return Err(ApiError::MalformedInput(format!(
                    "body kid '{}' does not match path kid '{}'",
                    key.kid, path_kid
                )));
            }
            warn!(set = %set, path_kid = %path_kid, body_kid = %key.kid, "Key id in body differs from path");
        }

        self.authorize(token, &self.namer.key(set, &key.kid), KeyAction::Update)
            .await?;

        self.store.add_key(set, &key).await?;

        info!(set = %set, kid = %key.kid, "Updated key");

        Ok(key)
    }

    /// Delete a whole set
    pub async fn delete_key_set(&self, token: Option<&str>, set: &str) -> Result<(), ApiError> {
        self.authorize(token, &self.namer.key_set(set), KeyAction::Delete)
            .await?;

        self.store.delete_key_set(set).await?;
        Ok(())
    }

    /// Delete one key of a set
    pub async fn delete_key(
        &self,
        token: Option<&str>,
        set: &str,
        kid: &str,
    ) -> Result<(), ApiError> {
        self.authorize(token, &self.namer.key(set, kid), KeyAction::Delete)
            .await?;

        self.store.delete_key(set, kid).await?;
        Ok(())
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Make sure the well-known set exists, generating it with `alg` if not
    ///
    /// Runs without authorization; meant for process startup only.
    pub async fn ensure_well_known_keys(&self, alg: &str) -> Result<(), ApiError> {
        let set = self.config.well_known_set.as_str();

        match self.store.get_key_set(set).await {
            Ok(_) => return Ok(()),
            Err(StorageError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }

        let generator = self.generators.require(alg)?;
        let kid = uuid::Uuid::new_v4().to_string();
        let keys = tokio::task::spawn_blocking(move || generator.generate(&kid))
            .await
            .map_err(|e| ApiError::GenerationFailure(format!("generator task failed: {}", e)))??;

        self.store.add_key_set(set, &keys).await?;

        info!(set = %set, alg = %alg, kids = ?keys.kids(), "Generated well-known key set");
        Ok(())
    }
}
