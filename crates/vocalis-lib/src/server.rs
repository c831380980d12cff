//! HTTP API for the skill webhook.
//!
//! `POST {path}` takes the raw skill request and answers with the voice
//! envelope; `GET /health` is the keep-alive target. CORS-permissive, like
//! the rest of the voice tooling.
//!
//! The skill body is parsed whatever its `Content-Type`: an empty body is a
//! request without a query, a body that isn't JSON is a 400.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use vocalis_core::types::{SkillResponse, extract_query};

use crate::assembler::Assembler;
use crate::config::HEALTH_PATH;
use crate::provider::TextProvider;

/// Build the axum router, mounting the skill handler at `path`.
pub fn router<P: TextProvider + 'static>(assembler: Arc<Assembler<P>>, path: &str) -> Router {
    Router::new()
        .route(path, post(skill::<P>))
        .route(HEALTH_PATH, get(health))
        .layer(CorsLayer::permissive())
        .with_state(assembler)
}

async fn skill<P: TextProvider>(
    State(assembler): State<Arc<Assembler<P>>>,
    body: Bytes,
) -> Result<Json<SkillResponse>, (StatusCode, String)> {
    let body: serde_json::Value = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            warn!("rejecting skill request: {e}");
            (StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}"))
        })?
    };
    let query = extract_query(&body);
    info!(has_query = query.is_some(), "skill request");
    Ok(Json(assembler.handle(query).await.into()))
}

#[derive(serde::Serialize)]
struct OkResponse {
    ok: bool,
}

async fn health() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}
