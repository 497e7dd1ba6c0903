//! Session identity generation.

use crate::error::Result;

/// Produces globally-unique session identifiers.
///
/// Identifiers must be printable strings usable directly as engine keys,
/// unique with overwhelming probability across every instance of the
/// service with no coordination, and can never equal the reserved internal
/// field name used for TTL bookkeeping.
pub trait IdGenerator: Send + Sync {
    /// Generate a fresh identifier.
    ///
    /// Fails with [`crate::StoreError::Generation`] only if the entropy
    /// source is unavailable.
    fn generate(&self) -> Result<String>;
}

/// Production generator: random (v4) UUIDs.
///
/// UUIDs are hex-and-dash strings, so they cannot collide with the
/// underscore-prefixed reserved TTL field.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> Result<String> {
        Ok(uuid::Uuid::new_v4().to_string())
    }
}
