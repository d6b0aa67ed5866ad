use crate::domain::chunk::ChunkResponse;
use crate::error::IndexResult;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub library_id: Uuid,
    pub query: String,
    pub k: usize,
}

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> IndexResult<Json<Vec<ChunkResponse>>> {
    let chunks = state.index_service.search(request.library_id, &request.query, request.k).await?;
    Ok(Json(chunks.iter().map(ChunkResponse::from).collect()))
}
