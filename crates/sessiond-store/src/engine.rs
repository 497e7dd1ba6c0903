//! Storage engine trait for pluggable external stores.
//!
//! The external engine is the only shared mutable state in the system.
//! This trait pins down exactly the primitives the persistence strategies
//! need — document operations addressed by path, hash operations addressed
//! by field, and key-level delete/expire — so the rest of the crate depends
//! only on this seam and tests can substitute [`crate::MemoryEngine`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Capability interface over the external key-value/document engine.
///
/// Document paths use the dotted form the engine understands: `"."` is the
/// document root, `".name"` a top-level member. All operations are single
/// round-trips; the engine provides no multi-key transaction primitive, so
/// any batching above this trait is a sequence of independent calls.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so one engine handle can be
/// shared across concurrent request tasks.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// Set the JSON value at `path` inside the document stored under `key`.
    ///
    /// Setting the root path creates the document. Setting a member path on
    /// a key with no document is an error.
    async fn doc_set(&self, key: &str, path: &str, json: &str) -> Result<()>;

    /// Get the whole document stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist (or has expired).
    async fn doc_get(&self, key: &str) -> Result<Option<String>>;

    /// Delete the value at `path` inside the document under `key`.
    ///
    /// Deleting an absent path is a no-op.
    async fn doc_del(&self, key: &str, path: &str) -> Result<()>;

    /// Set one field of the hash stored under `key`, creating the hash if
    /// it does not exist.
    async fn hash_set(&self, key: &str, field: &str, payload: &str) -> Result<()>;

    /// Get every field of the hash stored under `key`.
    ///
    /// Returns an empty map if the key does not exist.
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>>;

    /// Delete one field of the hash stored under `key`.
    ///
    /// Deleting an absent field is a no-op.
    async fn hash_del(&self, key: &str, field: &str) -> Result<()>;

    /// Delete `key` and everything stored under it.
    ///
    /// Deleting an absent key is a no-op.
    async fn del_key(&self, key: &str) -> Result<()>;

    /// Expire `key` after `ttl`. A no-op if the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Whether `key` currently exists.
    async fn exists(&self, key: &str) -> Result<bool>;
}
