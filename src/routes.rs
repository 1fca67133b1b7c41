use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::{
    error::AppError, state::AppState, thought::RECENT_LIMIT, utils::get_message_from_body,
};

pub const WELCOME: &str = "Happy Thoughts API";

#[derive(Serialize, Debug, Clone, Copy)]
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// Served by `GET /`. Keep in step with [`router`].
pub const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        method: "GET",
        path: "/",
        description: "This listing",
    },
    Endpoint {
        method: "GET",
        path: "/thoughts",
        description: "The 20 most recent thoughts, newest first",
    },
    Endpoint {
        method: "POST",
        path: "/thoughts",
        description: "Post a thought, body {\"message\": string} of 5 to 140 characters",
    },
    Endpoint {
        method: "POST",
        path: "/thoughts/{thought_id}/like",
        description: "Add one heart to a thought",
    },
];

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root_handler))
        .route("/thoughts", get(list_handler).post(create_handler))
        .route("/thoughts/{thought_id}/like", post(like_handler))
}

pub async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "message": WELCOME,
        "endpoints": ENDPOINTS,
    }))
}

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let thoughts = state.store.recent(RECENT_LIMIT).await?;

    Ok(Json(thoughts))
}

pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let message = get_message_from_body(&body)?;

    let thought = state.store.create(message).await?;
    debug!("Created thought {}", thought.id);

    Ok((StatusCode::CREATED, Json(thought)))
}

pub async fn like_handler(
    State(state): State<Arc<AppState>>,
    thought_id: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    // an undecodable segment cannot name a stored thought
    let Path(thought_id) = thought_id.map_err(|e| AppError::NotFound(e.body_text()))?;

    let thought = state
        .store
        .like(&thought_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Thought {thought_id} not found")))?;
    debug!("Thought {} now has {} hearts", thought.id, thought.hearts);

    Ok(Json(thought))
}
