//! Key Set Handlers
//!
//! Thin transport adapters: each handler extracts the path parameters, the
//! bearer token and the raw body, then calls the matching lifecycle
//! operation. Authorization and storage live in [`KeySetService`].

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use keyset_core::{Jwk, KeySet};
use keyset_firewall::bearer_token;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::keys::KeySetService;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Policy-gated key-set operations
    pub keys: KeySetService,
}

/// Bearer token of the request, if any
pub(crate) fn request_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
}

/// Retrieve a single key
///
/// GET /keys/{set}/{key}
pub async fn get_key(
    State(state): State<Arc<AppState>>,
    Path((set, kid)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<KeySet>, ApiError> {
    let keys = state.keys.get_key(request_token(&headers), &set, &kid).await?;
    Ok(Json(keys))
}

/// Retrieve a whole key set
///
/// GET /keys/{set}
pub async fn get_key_set(
    State(state): State<Arc<AppState>>,
    Path(set): Path<String>,
    headers: HeaderMap,
) -> Result<Json<KeySet>, ApiError> {
    let keys = state.keys.get_key_set(request_token(&headers), &set).await?;
    Ok(Json(keys))
}

/// Generate a new key set
///
/// POST /keys/{set}
///
/// Body: `{ "alg": "RS256", "kid": "my-key" }`. Responds 201 with the
/// generated keys and the set's location.
pub async fn create_key_set(
    State(state): State<Arc<AppState>>,
    Path(set): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let keys = state.keys.create(request_token(&headers), &set, &body).await?;

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());
    let location = state.keys.config().location(host, &set);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(keys)))
}

/// Merge client-supplied keys into a set
///
/// PUT /keys/{set}
pub async fn update_key_set(
    State(state): State<Arc<AppState>>,
    Path(set): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<KeySet>, ApiError> {
    let keys = state
        .keys
        .update_key_set(request_token(&headers), &set, &body)
        .await?;
    Ok(Json(keys))
}

/// Merge one client-supplied key into a set
///
/// PUT /keys/{set}/{key}
pub async fn update_key(
    State(state): State<Arc<AppState>>,
    Path((set, kid)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Jwk>, ApiError> {
    let key = state
        .keys
        .update_key(request_token(&headers), &set, &kid, &body)
        .await?;
    Ok(Json(key))
}

/// Delete a key set
///
/// DELETE /keys/{set}
pub async fn delete_key_set(
    State(state): State<Arc<AppState>>,
    Path(set): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    state.keys.delete_key_set(request_token(&headers), &set).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a single key
///
/// DELETE /keys/{set}/{key}
pub async fn delete_key(
    State(state): State<Arc<AppState>>,
    Path((set, kid)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    state.keys.delete_key(request_token(&headers), &set, &kid).await?;
    Ok(StatusCode::NO_CONTENT)
}
