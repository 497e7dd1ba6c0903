//! In-memory storage engine double.
//!
//! Mirrors the observable behavior of the real engine closely enough for
//! unit tests and local runs: per-key expiry deadlines, document vs hash
//! typing per key, and the same absent-key semantics the strategies rely
//! on. Expired entries are purged lazily on access.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::engine::StorageEngine;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone)]
enum Stored {
    Doc(serde_json::Value),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct Entry {
    stored: Stored,
    deadline: Option<Instant>,
}

/// In-process [`StorageEngine`] backed by a locked map.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Split a dotted document path into its single member name, or `None`
/// for the root path.
fn member_of(path: &str) -> Result<Option<&str>> {
    if path == "." {
        return Ok(None);
    }
    path.strip_prefix('.')
        .filter(|m| !m.is_empty() && !m.contains('.'))
        .map(Some)
        .ok_or_else(|| StoreError::Backend(format!("unsupported document path {path:?}")))
}

fn purge(entries: &mut HashMap<String, Entry>, key: &str) {
    let expired = entries
        .get(key)
        .and_then(|e| e.deadline)
        .is_some_and(|d| Instant::now() >= d);
    if expired {
        entries.remove(key);
    }
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::Backend(format!(
        "operation against a key holding the wrong kind of value: {key}"
    ))
}

#[async_trait]
impl StorageEngine for MemoryEngine {
    async fn doc_set(&self, key: &str, path: &str, json: &str) -> Result<()> {
        let parsed: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| StoreError::Backend(format!("invalid document payload: {e}")))?;

        let mut entries = self.entries.lock();
        purge(&mut entries, key);

        match member_of(path)? {
            None => {
                // Re-setting the root keeps an existing expiry deadline.
                let deadline = entries.get(key).and_then(|e| e.deadline);
                entries.insert(
                    key.to_string(),
                    Entry {
                        stored: Stored::Doc(parsed),
                        deadline,
                    },
                );
            }
            Some(member) => match entries.get_mut(key) {
                Some(Entry {
                    stored: Stored::Doc(serde_json::Value::Object(doc)),
                    ..
                }) => {
                    doc.insert(member.to_string(), parsed);
                }
                Some(_) => return Err(wrong_type(key)),
                None => {
                    return Err(StoreError::Backend(format!(
                        "missing document root for key {key}"
                    )));
                }
            },
        }
        Ok(())
    }

    async fn doc_get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock();
        purge(&mut entries, key);
        match entries.get(key) {
            None => Ok(None),
            Some(Entry {
                stored: Stored::Doc(doc),
                ..
            }) => {
                let text = serde_json::to_string(doc)
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                Ok(Some(text))
            }
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn doc_del(&self, key: &str, path: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        purge(&mut entries, key);
        match member_of(path)? {
            None => {
                entries.remove(key);
            }
            Some(member) => match entries.get_mut(key) {
                Some(Entry {
                    stored: Stored::Doc(serde_json::Value::Object(doc)),
                    ..
                }) => {
                    doc.remove(member);
                }
                Some(_) => return Err(wrong_type(key)),
                None => {}
            },
        }
        Ok(())
    }

    async fn hash_set(&self, key: &str, field: &str, payload: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        purge(&mut entries, key);
        match entries.get_mut(key) {
            None => {
                let mut fields = HashMap::new();
                fields.insert(field.to_string(), payload.to_string());
                entries.insert(
                    key.to_string(),
                    Entry {
                        stored: Stored::Hash(fields),
                        deadline: None,
                    },
                );
            }
            Some(Entry {
                stored: Stored::Hash(fields),
                ..
            }) => {
                fields.insert(field.to_string(), payload.to_string());
            }
            Some(_) => return Err(wrong_type(key)),
        }
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut entries = self.entries.lock();
        purge(&mut entries, key);
        match entries.get(key) {
            None => Ok(HashMap::new()),
            Some(Entry {
                stored: Stored::Hash(fields),
                ..
            }) => Ok(fields.clone()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn hash_del(&self, key: &str, field: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        purge(&mut entries, key);
        match entries.get_mut(key) {
            None => Ok(()),
            Some(Entry {
                stored: Stored::Hash(fields),
                ..
            }) => {
                fields.remove(field);
                Ok(())
            }
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn del_key(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock();
        purge(&mut entries, key);
        if let Some(entry) = entries.get_mut(key) {
            entry.deadline = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock();
        purge(&mut entries, key);
        Ok(entries.contains_key(key))
    }
}
