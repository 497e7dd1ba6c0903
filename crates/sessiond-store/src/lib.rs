//! Session storage core for sessiond.
//!
//! This crate owns the session data model and everything between the public
//! session operations and the external key-value engine:
//!
//! - [`SessionStore`] — the seven session-level operations (create, add
//!   one/many fields, fetch, delete one/many fields, invalidate)
//! - [`StorageEngine`] — the capability trait over the external engine,
//!   implemented by [`RedisEngine`] for production and [`MemoryEngine`] as
//!   an in-process double
//! - the two persistence strategies: one JSON document per session
//!   ([`DocumentStrategy`]) or one hash of independently addressable fields
//!   per session ([`FlatStrategy`])
//! - [`IdGenerator`] — session identity creation
//!
//! The external engine is the single source of truth; the store holds no
//! session state between calls and performs no in-process locking.
//!
//! # Example
//!
//! ```rust,ignore
//! use sessiond_store::{MemoryEngine, SessionStore, StoreConfig};
//!
//! let engine = Arc::new(MemoryEngine::new());
//! let store = SessionStore::new(engine, StoreConfig::default());
//! let id = store.create_session(3600).await?;
//! ```

mod config;
mod engine;
mod error;
mod id;
mod memory;
mod redis;
mod store;
mod strategy;

pub use config::{CreatePolicy, StoreConfig, StrategyKind};
pub use engine::StorageEngine;
pub use error::{Result, StoreError};
pub use id::{IdGenerator, UuidIdGenerator};
pub use memory::MemoryEngine;
pub use self::redis::{RedisEngine, RedisEngineOptions};
pub use store::{SessionFields, SessionStore};
pub use strategy::{DocumentStrategy, FlatStrategy, PersistenceStrategy, TTL_FIELD};
