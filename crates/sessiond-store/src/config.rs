//! Configuration for the session store.

use std::str::FromStr;

/// Which persistence layout a deployment uses.
///
/// Exactly one strategy is active per deployment; the store's public
/// contract is identical either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// One JSON document per session, fields addressed by path.
    #[default]
    Document,
    /// One hash per session, fields independently addressable.
    Flat,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" => Ok(StrategyKind::Document),
            "flat" => Ok(StrategyKind::Flat),
            other => Err(format!(
                "unknown strategy {other:?} (expected \"document\" or \"flat\")"
            )),
        }
    }
}

/// What a field write to an unknown session id does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePolicy {
    /// Writing to an unknown id creates storage for it first.
    #[default]
    AutoCreate,
    /// Writing to an unknown id fails with
    /// [`crate::StoreError::SessionNotFound`].
    Reject,
}

impl FromStr for CreatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "true" | "auto" | "auto-create" => Ok(CreatePolicy::AutoCreate),
            "false" | "reject" => Ok(CreatePolicy::Reject),
            other => Err(format!("unknown create policy {other:?}")),
        }
    }
}

/// Configuration for [`crate::SessionStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConfig {
    /// Persistence layout.
    pub strategy: StrategyKind,

    /// Behavior of field writes to unknown session ids.
    pub create_policy: CreatePolicy,
}

impl StoreConfig {
    /// Create a configuration with default values (document strategy,
    /// auto-create on write).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the persistence strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the create policy for field writes to unknown ids.
    pub fn with_create_policy(mut self, policy: CreatePolicy) -> Self {
        self.create_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("document".parse(), Ok(StrategyKind::Document));
        assert_eq!("FLAT".parse(), Ok(StrategyKind::Flat));
        assert!("json".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("true".parse(), Ok(CreatePolicy::AutoCreate));
        assert_eq!("reject".parse(), Ok(CreatePolicy::Reject));
        assert!("maybe".parse::<CreatePolicy>().is_err());
    }
}
