//! Session operation endpoints.
//!
//! One handler per store operation, 1:1. Handlers deserialize the inbound
//! message, call the store, and wrap the result; no business logic lives
//! here.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use sessiond_store::SessionFields;
use sessiond_types::Value;

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for session creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Time-to-live in seconds; `0` (the default) means no expiration.
    #[serde(default)]
    pub ttl: u64,
}

/// Request body for the batch value write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddValuesRequest {
    /// Field name to value; applied in key order, stopping at the first
    /// failure with earlier writes left in place.
    pub values: BTreeMap<String, Value>,
}

/// Request body for the batch value removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveValuesRequest {
    /// Keys to remove, in order.
    pub keys: Vec<String>,
}

/// A session id with its full current field set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Session id.
    pub id: String,
    /// Every field currently attached to the session.
    pub values: BTreeMap<String, Value>,
}

impl SessionResponse {
    fn new(id: impl Into<String>, values: SessionFields) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }
}

/// Outcome of a delete-shaped operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Whether the operation was applied.
    pub successful: bool,
}

impl SuccessResponse {
    fn ok() -> Self {
        Self { successful: true }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions - Create a new empty session.
pub async fn create_session_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, ServerError> {
    let id = state.store.create_session(request.ttl).await?;
    Ok(Json(SessionResponse::new(id, BTreeMap::new())))
}

/// GET /api/v1/sessions/:id - Fetch a session's full field set.
pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ServerError> {
    let values = state.store.get_session(&id).await?;
    Ok(Json(SessionResponse::new(id, values)))
}

/// DELETE /api/v1/sessions/:id - Invalidate a whole session.
pub async fn invalidate_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ServerError> {
    state.store.invalidate_session(&id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// PUT /api/v1/sessions/:id/values/:key - Attach one value.
pub async fn add_value_handler(
    State(state): State<AppState>,
    Path((id, key)): Path<(String, String)>,
    Json(value): Json<Value>,
) -> Result<Json<SessionResponse>, ServerError> {
    let values = state.store.add_field(&id, &key, value).await?;
    Ok(Json(SessionResponse::new(id, values)))
}

/// PUT /api/v1/sessions/:id/values - Attach many values.
pub async fn add_values_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddValuesRequest>,
) -> Result<Json<SessionResponse>, ServerError> {
    let values = state.store.add_fields(&id, request.values).await?;
    Ok(Json(SessionResponse::new(id, values)))
}

/// DELETE /api/v1/sessions/:id/values/:key - Remove one value.
///
/// Removing a key that was never attached is a success.
pub async fn remove_value_handler(
    State(state): State<AppState>,
    Path((id, key)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, ServerError> {
    state.store.remove_field(&id, &key).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/v1/sessions/:id/values/remove - Remove many values.
pub async fn remove_values_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RemoveValuesRequest>,
) -> Result<Json<SuccessResponse>, ServerError> {
    state.store.remove_fields(&id, &request.keys).await?;
    Ok(Json(SuccessResponse::ok()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
