//! Persistence strategies: how a session maps onto engine primitives.
//!
//! The document strategy keeps a whole session as one JSON document keyed
//! by the session id; each field is a top-level member holding the codec's
//! encoded text. The flat strategy keeps one hash per session, field name
//! to encoded text, with the TTL recorded under a reserved field name.
//!
//! Both strategies present the same contract: absent sessions read as an
//! empty field set, and the reserved TTL field is never returned.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sessiond_types::{decode, encode, Value};

use crate::engine::StorageEngine;
use crate::error::{Result, StoreError};

/// Reserved field name under which the flat strategy persists the TTL.
///
/// Filtered from every field set returned to callers. Session ids are
/// UUIDs, so a session key can never collide with it.
pub const TTL_FIELD: &str = "__session_ttl";

/// Session-level persistence operations, independent of layout.
#[async_trait]
pub trait PersistenceStrategy: Send + Sync {
    /// Create empty storage for a session, applying `ttl` when given.
    async fn create(&self, id: &str, ttl: Option<Duration>) -> Result<()>;

    /// Write one field.
    async fn put_field(&self, id: &str, key: &str, value: &Value) -> Result<()>;

    /// Read every field. Absent sessions read as an empty map.
    async fn fetch(&self, id: &str) -> Result<BTreeMap<String, Value>>;

    /// Delete one field. Absent fields are a no-op.
    async fn remove_field(&self, id: &str, key: &str) -> Result<()>;

    /// Delete the whole session.
    async fn remove(&self, id: &str) -> Result<()>;

    /// Whether storage for the session currently exists.
    async fn exists(&self, id: &str) -> Result<bool>;
}

/// Whole-session-as-one-JSON-document persistence.
pub struct DocumentStrategy {
    engine: Arc<dyn StorageEngine>,
}

impl DocumentStrategy {
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self { engine }
    }

    fn field_path(key: &str) -> String {
        format!(".{key}")
    }
}

#[async_trait]
impl PersistenceStrategy for DocumentStrategy {
    async fn create(&self, id: &str, ttl: Option<Duration>) -> Result<()> {
        // The empty object is the reserved newly-created shape.
        self.engine.doc_set(id, ".", "{}").await?;
        if let Some(ttl) = ttl {
            self.engine.expire(id, ttl).await?;
        }
        Ok(())
    }

    async fn put_field(&self, id: &str, key: &str, value: &Value) -> Result<()> {
        let encoded = encode(value)?;
        // The member holds the codec text, embedded as a JSON string.
        let member = serde_json::to_string(&encoded)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.engine
            .doc_set(id, &Self::field_path(key), &member)
            .await
    }

    async fn fetch(&self, id: &str) -> Result<BTreeMap<String, Value>> {
        let doc = match self.engine.doc_get(id).await? {
            Some(doc) => doc,
            None => return Ok(BTreeMap::new()),
        };
        let members: BTreeMap<String, String> = serde_json::from_str(&doc)
            .map_err(|e| StoreError::Backend(format!("malformed session document: {e}")))?;

        let mut fields = BTreeMap::new();
        for (key, encoded) in members {
            fields.insert(key, decode(&encoded)?);
        }
        Ok(fields)
    }

    async fn remove_field(&self, id: &str, key: &str) -> Result<()> {
        self.engine.doc_del(id, &Self::field_path(key)).await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.engine.del_key(id).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        self.engine.exists(id).await
    }
}

/// One-hash-per-session persistence.
pub struct FlatStrategy {
    engine: Arc<dyn StorageEngine>,
}

impl FlatStrategy {
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl PersistenceStrategy for FlatStrategy {
    async fn create(&self, id: &str, ttl: Option<Duration>) -> Result<()> {
        let secs = ttl.map(|t| t.as_secs()).unwrap_or(0);
        // The TTL is recorded as an ordinary field under the reserved name
        // so the hash exists even for an empty session, and enforced with
        // a key-level expiry.
        self.engine
            .hash_set(id, TTL_FIELD, &secs.to_string())
            .await?;
        if let Some(ttl) = ttl {
            self.engine.expire(id, ttl).await?;
        }
        Ok(())
    }

    async fn put_field(&self, id: &str, key: &str, value: &Value) -> Result<()> {
        let encoded = encode(value)?;
        self.engine.hash_set(id, key, &encoded).await
    }

    async fn fetch(&self, id: &str) -> Result<BTreeMap<String, Value>> {
        let mut fields = BTreeMap::new();
        for (key, encoded) in self.engine.hash_get_all(id).await? {
            if key == TTL_FIELD {
                continue;
            }
            fields.insert(key, decode(&encoded)?);
        }
        Ok(fields)
    }

    async fn remove_field(&self, id: &str, key: &str) -> Result<()> {
        self.engine.hash_del(id, key).await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.engine.del_key(id).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        self.engine.exists(id).await
    }
}
