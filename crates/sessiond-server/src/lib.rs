//! HTTP request adapter for the sessiond session store.
//!
//! This crate is the transport boundary: one endpoint per store operation,
//! no business logic of its own. Handlers deserialize the inbound message,
//! call the corresponding [`sessiond_store::SessionStore`] operation, and
//! serialize the result or map the error to an HTTP failure.
//!
//! # Example
//!
//! ```ignore
//! use sessiond_server::Server;
//! use sessiond_store::{RedisEngine, RedisEngineOptions, SessionStore, StoreConfig};
//!
//! let engine = Arc::new(RedisEngine::connect(RedisEngineOptions::new(url))?);
//! let store = SessionStore::new(engine, StoreConfig::default());
//! Server::new(store).run("127.0.0.1:8080".parse()?).await?;
//! ```

pub mod error;
pub mod routes;
pub mod state;

pub use error::{Result, ServerError};
pub use routes::{
    AddValuesRequest, CreateSessionRequest, RemoveValuesRequest, SessionResponse,
    SuccessResponse,
};
pub use state::AppState;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use sessiond_store::SessionStore;

/// The sessiond HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server over the given store.
    pub fn new(store: SessionStore) -> Self {
        Self {
            state: AppState::new(store),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .nest("/api/v1", Self::api_routes())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// API routes (v1), one per session store operation.
    fn api_routes() -> Router<AppState> {
        use axum::routing::{get, post, put};

        Router::new()
            .route("/sessions", post(routes::create_session_handler))
            .route(
                "/sessions/{id}",
                get(routes::get_session_handler).delete(routes::invalidate_session_handler),
            )
            .route("/sessions/{id}/values", put(routes::add_values_handler))
            .route(
                "/sessions/{id}/values/remove",
                post(routes::remove_values_handler),
            )
            .route(
                "/sessions/{id}/values/{key}",
                put(routes::add_value_handler).delete(routes::remove_value_handler),
            )
    }

    /// Run the server on the given address until shutdown.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {e}")))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use sessiond_store::{MemoryEngine, SessionStore, StoreConfig};
    use tower::ServiceExt;

    use super::*;

    fn create_test_server() -> Server {
        let store = SessionStore::new(Arc::new(MemoryEngine::new()), StoreConfig::new());
        Server::new(store)
    }

    #[tokio::test]
    async fn test_server_health_endpoint() {
        let app = create_test_server().router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = create_test_server().router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
