//! Well-known JWKS discovery
//!
//! Publishes the public halves of the ID token signing keys so third parties
//! can verify tokens. Anonymous access is granted per key by policy.

use axum::{extract::State, http::HeaderMap, Json};
use keyset_core::KeySet;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::handlers::keys::{request_token, AppState};

/// GET /.well-known/jwks.json
pub async fn well_known(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<KeySet>, ApiError> {
    let keys = state.keys.well_known(request_token(&headers)).await?;
    Ok(Json(keys))
}
