//! Environment-supplied configuration for sessiond.
//!
//! Everything is read from environment variables with working defaults, so
//! a bare `sessiond` against a local Redis needs no configuration at all:
//!
//! | Variable               | Default            | Meaning                          |
//! |------------------------|--------------------|----------------------------------|
//! | `REDIS_HOST`           | `localhost`        | Redis server host                |
//! | `REDIS_PORT`           | `6379`             | Redis server port                |
//! | `REDIS_DB`             | `0`                | Logical database index           |
//! | `REDIS_PASSWORD`       | (none)             | Credential, if the server wants one |
//! | `REDIS_MAXIDLE`        | `3`                | Connection pool size             |
//! | `SESSIOND_POOL_WAIT`   | `5`                | Pool acquisition timeout, seconds |
//! | `SESSIOND_BIND`        | `127.0.0.1:8080`   | HTTP listen address              |
//! | `SESSIOND_STRATEGY`    | `document`         | `document` or `flat` persistence |
//! | `SESSIOND_AUTO_CREATE` | `true`             | Field writes to unknown ids create storage (`reject` to refuse) |

mod error;

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use sessiond_store::{CreatePolicy, StoreConfig, StrategyKind};

pub use error::{ConfigError, Result};

/// Connection settings for the external Redis engine.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: u32,
    pub password: Option<String>,
    pub pool_size: usize,
    pub pool_wait: Duration,
}

impl RedisConfig {
    /// The connection URL for the client.
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{password}@{}:{}/{}",
                self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// External engine connection.
    pub redis: RedisConfig,

    /// HTTP listen address.
    pub bind: SocketAddr,

    /// Session store behavior (strategy and create policy).
    pub store: StoreConfig,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration from an arbitrary variable source. Empty values
    /// are treated as unset.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let redis = RedisConfig {
            host: get("REDIS_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&get, "REDIS_PORT", 6379)?,
            db: parse_or(&get, "REDIS_DB", 0)?,
            password: get("REDIS_PASSWORD"),
            pool_size: parse_or(&get, "REDIS_MAXIDLE", 3)?,
            pool_wait: Duration::from_secs(parse_or(&get, "SESSIOND_POOL_WAIT", 5)?),
        };

        let bind = parse_or(
            &get,
            "SESSIOND_BIND",
            SocketAddr::from(([127, 0, 0, 1], 8080)),
        )?;

        let store = StoreConfig::new()
            .with_strategy(parse_or(&get, "SESSIOND_STRATEGY", StrategyKind::Document)?)
            .with_create_policy(parse_or(
                &get,
                "SESSIOND_AUTO_CREATE",
                CreatePolicy::AutoCreate,
            )?);

        Ok(Self { redis, bind, store })
    }
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: name.to_string(),
            value: raw,
            reason: e.to_string(),
        }),
    }
}
