//! In-memory storage backend
//!
//! Default storage implementation using an in-memory hashmap of sets.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use keyset_core::{Jwk, KeySet};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::info;

use super::{KeyManager, StorageError};

/// In-memory key store implementation
#[derive(Debug, Default)]
pub struct MemoryKeyManager {
    sets: RwLock<HashMap<String, KeySet>>,
}

impl MemoryKeyManager {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StorageError {
    StorageError::Backend("key store lock poisoned".into())
}

fn set_not_found(set: &str) -> StorageError {
    StorageError::NotFound(format!("key set '{}'", set))
}

#[async_trait]
impl KeyManager for MemoryKeyManager {
    async fn add_key(&self, set: &str, key: &Jwk) -> Result<(), StorageError> {
        let mut sets = self.sets.write().map_err(poisoned)?;
        info!(set = %set, kid = %key.kid, "Storing key");
        sets.entry(set.to_string()).or_default().upsert(key.clone());
        Ok(())
    }

    async fn add_key_set(&self, set: &str, keys: &KeySet) -> Result<(), StorageError> {
        let mut sets = self.sets.write().map_err(poisoned)?;
        info!(set = %set, kids = ?keys.kids(), "Storing key set");
        sets.entry(set.to_string()).or_default().merge(keys.clone());
        Ok(())
    }

    async fn get_key(&self, set: &str, kid: &str) -> Result<KeySet, StorageError> {
        let sets = self.sets.read().map_err(poisoned)?;
        sets.get(set)
            .and_then(|keys| keys.key(kid))
            .map(|key| KeySet::from_keys(vec![key.clone()]))
            .ok_or_else(|| StorageError::NotFound(format!("key '{}' in set '{}'", kid, set)))
    }

    async fn get_key_set(&self, set: &str) -> Result<KeySet, StorageError> {
        let sets = self.sets.read().map_err(poisoned)?;
        match sets.get(set) {
            Some(keys) if !keys.is_empty() => Ok(keys.clone()),
            _ => Err(set_not_found(set)),
        }
    }

    async fn delete_key(&self, set: &str, kid: &str) -> Result<(), StorageError> {
        let mut sets = self.sets.write().map_err(poisoned)?;
        let keys = sets.get_mut(set).ok_or_else(|| set_not_found(set))?;
        if keys.remove(kid).is_some() {
            info!(set = %set, kid = %kid, "Deleted key");
        }
        Ok(())
    }

    async fn delete_key_set(&self, set: &str) -> Result<(), StorageError> {
        let mut sets = self.sets.write().map_err(poisoned)?;
        if sets.remove(set).is_some() {
            info!(set = %set, "Deleted key set");
        }
        Ok(())
    }
}
