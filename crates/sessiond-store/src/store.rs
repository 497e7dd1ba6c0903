//! The session store: public session-level operations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use sessiond_types::Value;
use tracing::{debug, info};

use crate::config::{CreatePolicy, StoreConfig, StrategyKind};
use crate::engine::StorageEngine;
use crate::error::{Result, StoreError};
use crate::id::{IdGenerator, UuidIdGenerator};
use crate::strategy::{DocumentStrategy, FlatStrategy, PersistenceStrategy, TTL_FIELD};

/// The field set of one session, as returned to callers.
pub type SessionFields = BTreeMap<String, Value>;

/// The core session storage abstraction.
///
/// Every operation is a fresh round-trip against the external engine; the
/// store holds no session state between calls and performs no in-process
/// locking. Concurrent writes to the same key are last-write-wins at the
/// engine's granularity.
///
/// Batch operations ([`add_fields`](Self::add_fields),
/// [`remove_fields`](Self::remove_fields)) decompose into repeated
/// single-key primitives, applied in order, stopping at the first failure.
/// Already-applied writes are not rolled back: callers must treat a batch
/// failure as "prefix applied, remainder unknown". Making this atomic
/// would need a multi-key transaction in the engine, which the per-field
/// primitives do not offer.
pub struct SessionStore {
    strategy: Arc<dyn PersistenceStrategy>,
    ids: Arc<dyn IdGenerator>,
    create_policy: CreatePolicy,
}

impl SessionStore {
    /// Create a store over `engine` with the given configuration.
    pub fn new(engine: Arc<dyn StorageEngine>, config: StoreConfig) -> Self {
        let strategy: Arc<dyn PersistenceStrategy> = match config.strategy {
            StrategyKind::Document => Arc::new(DocumentStrategy::new(engine)),
            StrategyKind::Flat => Arc::new(FlatStrategy::new(engine)),
        };
        Self {
            strategy,
            ids: Arc::new(UuidIdGenerator),
            create_policy: config.create_policy,
        }
    }

    /// Replace the identity generator (tests use deterministic ones).
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Create a new empty session, returning its id.
    ///
    /// `ttl_seconds == 0` means no expiration. The TTL is applied only
    /// here; there is no operation to change or refresh it later.
    pub async fn create_session(&self, ttl_seconds: u64) -> Result<String> {
        let id = self.ids.generate()?;
        let ttl = (ttl_seconds > 0).then(|| Duration::from_secs(ttl_seconds));
        self.strategy.create(&id, ttl).await?;
        info!(session_id = %id, ttl_seconds, "session created");
        Ok(id)
    }

    /// Attach one field to a session, returning the full field set after
    /// the write.
    pub async fn add_field(&self, id: &str, key: &str, value: Value) -> Result<SessionFields> {
        validate_key(key)?;
        self.ensure_writable(id).await?;
        self.strategy.put_field(id, key, &value).await?;
        debug!(session_id = %id, key, "field written");
        self.strategy.fetch(id).await
    }

    /// Attach many fields to a session, returning the full field set after
    /// all writes.
    ///
    /// Applied in order; stops at the first per-key failure with earlier
    /// writes left in place.
    pub async fn add_fields(
        &self,
        id: &str,
        values: BTreeMap<String, Value>,
    ) -> Result<SessionFields> {
        self.ensure_writable(id).await?;
        for (key, value) in &values {
            validate_key(key)?;
            self.strategy.put_field(id, key, value).await?;
            debug!(session_id = %id, key, "field written");
        }
        self.strategy.fetch(id).await
    }

    /// Fetch the full field set of a session.
    ///
    /// An absent (or expired) session reads as an empty field set, never
    /// an error, under both strategies.
    pub async fn get_session(&self, id: &str) -> Result<SessionFields> {
        self.strategy.fetch(id).await
    }

    /// Delete a whole session. Deleting an absent session succeeds.
    pub async fn invalidate_session(&self, id: &str) -> Result<()> {
        self.strategy.remove(id).await?;
        info!(session_id = %id, "session invalidated");
        Ok(())
    }

    /// Delete one field. Deleting an absent field succeeds.
    pub async fn remove_field(&self, id: &str, key: &str) -> Result<()> {
        self.strategy.remove_field(id, key).await?;
        debug!(session_id = %id, key, "field removed");
        Ok(())
    }

    /// Delete many fields, in order, stopping at the first failure with
    /// earlier removals left in place.
    pub async fn remove_fields(&self, id: &str, keys: &[String]) -> Result<()> {
        for key in keys {
            self.remove_field(id, key).await?;
        }
        Ok(())
    }

    /// Apply the configured create policy before a field write.
    async fn ensure_writable(&self, id: &str) -> Result<()> {
        if self.strategy.exists(id).await? {
            return Ok(());
        }
        match self.create_policy {
            CreatePolicy::AutoCreate => {
                debug!(session_id = %id, "auto-creating storage for unknown session");
                self.strategy.create(id, None).await
            }
            CreatePolicy::Reject => Err(StoreError::SessionNotFound(id.to_string())),
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key == TTL_FIELD {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::memory::MemoryEngine;

    /// Engine wrapper that fails any write touching one poisoned field.
    struct FailingEngine {
        inner: MemoryEngine,
        poisoned: String,
    }

    impl FailingEngine {
        fn new(poisoned: &str) -> Self {
            Self {
                inner: MemoryEngine::new(),
                poisoned: poisoned.to_string(),
            }
        }

        fn check(&self, field: &str) -> Result<()> {
            if field == self.poisoned {
                return Err(StoreError::Backend("injected write failure".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StorageEngine for FailingEngine {
        async fn doc_set(&self, key: &str, path: &str, json: &str) -> Result<()> {
            self.check(path.trim_start_matches('.'))?;
            self.inner.doc_set(key, path, json).await
        }

        async fn doc_get(&self, key: &str) -> Result<Option<String>> {
            self.inner.doc_get(key).await
        }

        async fn doc_del(&self, key: &str, path: &str) -> Result<()> {
            self.check(path.trim_start_matches('.'))?;
            self.inner.doc_del(key, path).await
        }

        async fn hash_set(&self, key: &str, field: &str, payload: &str) -> Result<()> {
            self.check(field)?;
            self.inner.hash_set(key, field, payload).await
        }

        async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
            self.inner.hash_get_all(key).await
        }

        async fn hash_del(&self, key: &str, field: &str) -> Result<()> {
            self.check(field)?;
            self.inner.hash_del(key, field).await
        }

        async fn del_key(&self, key: &str) -> Result<()> {
            self.inner.del_key(key).await
        }

        async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
            self.inner.expire(key, ttl).await
        }

        async fn exists(&self, key: &str) -> Result<bool> {
            self.inner.exists(key).await
        }
    }

    fn stores() -> Vec<SessionStore> {
        [StrategyKind::Document, StrategyKind::Flat]
            .into_iter()
            .map(|strategy| {
                SessionStore::new(
                    Arc::new(MemoryEngine::new()),
                    StoreConfig::new().with_strategy(strategy),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_create_then_get_is_empty() {
        for store in stores() {
            let id = store.create_session(0).await.unwrap();
            assert!(store.get_session(&id).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_consecutive_creates_get_distinct_ids() {
        for store in stores() {
            let a = store.create_session(0).await.unwrap();
            let b = store.create_session(0).await.unwrap();
            assert_ne!(a, b);
        }
    }

    #[tokio::test]
    async fn test_add_then_get() {
        for store in stores() {
            let id = store.create_session(0).await.unwrap();
            let fields = store
                .add_field(&id, "foo", Value::Int(15))
                .await
                .unwrap();
            assert_eq!(fields["foo"], Value::Int(15));

            let fetched = store.get_session(&id).await.unwrap();
            assert_eq!(fetched["foo"], Value::Int(15));
        }
    }

    #[tokio::test]
    async fn test_add_returns_full_field_set() {
        for store in stores() {
            let id = store.create_session(0).await.unwrap();
            store.add_field(&id, "a", Value::Int(1)).await.unwrap();
            let fields = store.add_field(&id, "b", Value::Int(2)).await.unwrap();
            assert_eq!(fields.len(), 2);
        }
    }

    #[tokio::test]
    async fn test_add_fields_batch() {
        for store in stores() {
            let id = store.create_session(0).await.unwrap();
            let mut values = BTreeMap::new();
            values.insert("a".to_string(), Value::Int(1));
            values.insert("b".to_string(), Value::Bool(true));
            let fields = store.add_fields(&id, values).await.unwrap();
            assert_eq!(fields.len(), 2);
        }
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        for store in stores() {
            let id = store.create_session(0).await.unwrap();
            let err = store.add_field(&id, "", Value::Null).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)));
        }
    }

    #[tokio::test]
    async fn test_reserved_key_rejected() {
        for store in stores() {
            let id = store.create_session(0).await.unwrap();
            let err = store
                .add_field(&id, TTL_FIELD, Value::Int(1))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)));
        }
    }

    #[tokio::test]
    async fn test_remove_absent_field_is_success() {
        for store in stores() {
            let id = store.create_session(0).await.unwrap();
            store.remove_field(&id, "nonexistent").await.unwrap();
            store
                .remove_fields(&id, &["also".to_string(), "missing".to_string()])
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_invalidate_session() {
        for store in stores() {
            let id = store.create_session(0).await.unwrap();
            store.add_field(&id, "foo", Value::Int(1)).await.unwrap();
            store.invalidate_session(&id).await.unwrap();
            assert!(store.get_session(&id).await.unwrap().is_empty());
            // Invalidating again is still a success.
            store.invalidate_session(&id).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_remove_fields_removes_listed_keys() {
        for store in stores() {
            let id = store.create_session(0).await.unwrap();
            for key in ["a", "b", "c"] {
                store.add_field(&id, key, Value::Int(1)).await.unwrap();
            }
            store
                .remove_fields(&id, &["a".to_string(), "c".to_string()])
                .await
                .unwrap();
            let fields = store.get_session(&id).await.unwrap();
            assert_eq!(fields.len(), 1);
            assert!(fields.contains_key("b"));
        }
    }

    #[tokio::test]
    async fn test_auto_create_on_unknown_id() {
        for store in stores() {
            let fields = store
                .add_field("never-created", "foo", Value::Int(1))
                .await
                .unwrap();
            assert_eq!(fields["foo"], Value::Int(1));
        }
    }

    #[tokio::test]
    async fn test_reject_policy_refuses_unknown_id() {
        for strategy in [StrategyKind::Document, StrategyKind::Flat] {
            let store = SessionStore::new(
                Arc::new(MemoryEngine::new()),
                StoreConfig::new()
                    .with_strategy(strategy)
                    .with_create_policy(CreatePolicy::Reject),
            );
            let err = store
                .add_field("never-created", "foo", Value::Int(1))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::SessionNotFound(_)));

            // Writes to sessions that do exist still work.
            let id = store.create_session(0).await.unwrap();
            store.add_field(&id, "foo", Value::Int(1)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_batch_failure_applies_prefix_only() {
        for strategy in [StrategyKind::Document, StrategyKind::Flat] {
            let store = SessionStore::new(
                Arc::new(FailingEngine::new("b")),
                StoreConfig::new().with_strategy(strategy),
            );
            let id = store.create_session(0).await.unwrap();

            let mut values = BTreeMap::new();
            values.insert("a".to_string(), Value::Int(1));
            values.insert("b".to_string(), Value::Int(2));
            values.insert("c".to_string(), Value::Int(3));

            let err = store.add_fields(&id, values).await.unwrap_err();
            assert!(matches!(err, StoreError::Backend(_)));

            let fields = store.get_session(&id).await.unwrap();
            assert!(fields.contains_key("a"), "prefix write must remain");
            assert!(!fields.contains_key("b"));
            assert!(!fields.contains_key("c"), "writes after the failure must not apply");
        }
    }

    struct FixedIdGenerator(&'static str);

    impl crate::IdGenerator for FixedIdGenerator {
        fn generate(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenIdGenerator;

    impl crate::IdGenerator for BrokenIdGenerator {
        fn generate(&self) -> Result<String> {
            Err(StoreError::Generation("entropy source unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_custom_id_generator() {
        let store = SessionStore::new(Arc::new(MemoryEngine::new()), StoreConfig::new())
            .with_id_generator(Arc::new(FixedIdGenerator("fixed-id")));
        assert_eq!(store.create_session(0).await.unwrap(), "fixed-id");
    }

    #[tokio::test]
    async fn test_generation_failure_aborts_create() {
        let store = SessionStore::new(Arc::new(MemoryEngine::new()), StoreConfig::new())
            .with_id_generator(Arc::new(BrokenIdGenerator));
        let err = store.create_session(0).await.unwrap_err();
        assert!(matches!(err, StoreError::Generation(_)));
    }

    #[tokio::test]
    async fn test_ttl_expiry_end_to_end() {
        for store in stores() {
            let id = store.create_session(1).await.unwrap();
            assert!(store.get_session(&id).await.unwrap().is_empty());
            // Short of waiting a full second, confirm the session is
            // reachable now; sub-second expiry is covered at strategy level.
            store.add_field(&id, "foo", Value::Int(1)).await.unwrap();
            assert_eq!(store.get_session(&id).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_nested_value_roundtrips_through_store() {
        for store in stores() {
            let id = store.create_session(0).await.unwrap();
            let mut inner = BTreeMap::new();
            inner.insert("deep".to_string(), Value::List(vec![
                Value::Null,
                Value::Float(2.5),
                Value::Str("x".to_string()),
            ]));
            let value = Value::Map(inner);
            let fields = store.add_field(&id, "nested", value.clone()).await.unwrap();
            assert_eq!(fields["nested"], value);
        }
    }
}
