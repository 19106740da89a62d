//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::state::AppState;

/// Live participant count of a room
#[derive(Debug, Serialize)]
pub struct RoomCountDto {
    pub room_id: String,
    pub client_count: u64,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the number of clients currently in a room
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Json<RoomCountDto> {
    let client_count = state.hub.room_client_count(&room_id).await;
    Json(RoomCountDto {
        room_id,
        client_count,
    })
}
