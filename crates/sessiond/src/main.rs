//! sessiond - network-exposed session store.
//!
//! Main entry point: read the environment, connect the storage engine,
//! serve the session API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use sessiond_config::Config;
use sessiond_server::Server;
use sessiond_store::{MemoryEngine, RedisEngine, RedisEngineOptions, SessionStore, StorageEngine};

/// Network-exposed session store backed by Redis.
#[derive(Parser)]
#[command(name = "sessiond")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Listen address (overrides SESSIOND_BIND)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Serve from a process-local in-memory engine instead of Redis.
    /// Sessions do not survive a restart; useful for local development.
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "sessiond=debug,sessiond_store=debug,sessiond_server=debug,info"
    } else {
        "sessiond=info,sessiond_store=info,sessiond_server=info,warn"
    };
    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config = Config::from_env()?;
    let bind = cli.bind.unwrap_or(config.bind);

    let engine: Arc<dyn StorageEngine> = if cli.memory {
        info!("using in-memory storage engine");
        Arc::new(MemoryEngine::new())
    } else {
        let options = RedisEngineOptions {
            url: config.redis.url(),
            pool_size: config.redis.pool_size,
            wait_timeout: config.redis.pool_wait,
        };
        info!(
            host = %config.redis.host,
            port = config.redis.port,
            db = config.redis.db,
            pool_size = config.redis.pool_size,
            "connecting to redis"
        );
        Arc::new(RedisEngine::connect(options)?)
    };

    let store = SessionStore::new(engine, config.store);
    info!(strategy = ?config.store.strategy, policy = ?config.store.create_policy, %bind, "sessiond starting");

    Server::new(store).run(bind).await?;
    Ok(())
}
