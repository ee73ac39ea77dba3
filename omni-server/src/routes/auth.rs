//! OAuth callback, refresh, and state routes.

use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use libomnipost::auth::CallbackRequest;
use libomnipost::types::PlatformId;

use crate::error::ApiError;
use crate::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-state", post(generate_state))
        .route("/:platform/callback", post(callback))
        .route("/:platform/refresh", post(refresh))
}

fn parse_platform(name: &str) -> Result<PlatformId, ApiError> {
    name.parse::<PlatformId>().map_err(ApiError::BadRequest)
}

async fn generate_state(State(state): State<AppState>) -> Json<Value> {
    let issued = state.oauth.generate_state().await;
    Json(json!({
        "state": issued.state,
        "codeVerifier": issued.code_verifier,
    }))
}

async fn callback(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Json(request): Json<CallbackRequest>,
) -> Result<Json<Value>, ApiError> {
    let platform = parse_platform(&platform)?;
    info!(platform = %platform, "OAuth callback received");

    let auth = state.oauth.handle_callback(platform, request).await?;
    Ok(Json(serde_json::to_value(auth).map_err(|e| {
        ApiError::Internal(format!("Failed to serialize auth: {}", e))
    })?))
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

async fn refresh(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<Value>, ApiError> {
    let platform = parse_platform(&platform)?;

    let auth = state
        .oauth
        .refresh(platform, &request.refresh_token)
        .await?;
    Ok(Json(serde_json::to_value(auth).map_err(|e| {
        ApiError::Internal(format!("Failed to serialize auth: {}", e))
    })?))
}
