//! Storage abstraction for key sets
//!
//! This module provides a trait-based abstraction over the durable key store.
//! The store owns merge semantics: writing a set or a key replaces keys with
//! the same id and appends new ones, keeping insertion order.

pub mod memory;

pub use memory::MemoryKeyManager;

use async_trait::async_trait;
use keyset_core::{Jwk, KeySet};
use std::fmt::Debug;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Key store backing the key-set service
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait KeyManager: Send + Sync + Debug {
    /// Merge a single key into a set, creating the set if needed
    async fn add_key(&self, set: &str, key: &Jwk) -> Result<(), StorageError>;

    /// Merge keys into a set, creating the set if needed
    async fn add_key_set(&self, set: &str, keys: &KeySet) -> Result<(), StorageError>;

    /// Get a single key, wrapped in a key set
    async fn get_key(&self, set: &str, kid: &str) -> Result<KeySet, StorageError>;

    /// Get all keys of a set
    async fn get_key_set(&self, set: &str) -> Result<KeySet, StorageError>;

    /// Remove a single key from a set
    async fn delete_key(&self, set: &str, kid: &str) -> Result<(), StorageError>;

    /// Remove a set and all its keys
    async fn delete_key_set(&self, set: &str) -> Result<(), StorageError>;
}
