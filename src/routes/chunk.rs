use crate::domain::chunk::{ChunkCreate, ChunkResponse, ChunkUpdate};
use crate::error::IndexResult;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

pub async fn create_chunk(
    State(state): State<AppState>,
    Query(create): Query<ChunkCreate>,
) -> IndexResult<(StatusCode, Json<ChunkResponse>)> {
    let chunk = state.chunks.create_chunk(create).await?;
    Ok((StatusCode::CREATED, Json((&chunk).into())))
}

pub async fn list_chunks(State(state): State<AppState>) -> Json<Vec<ChunkResponse>> {
    Json(state.chunks.list_chunks().iter().map(ChunkResponse::from).collect())
}

pub async fn get_chunk(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> IndexResult<Json<ChunkResponse>> {
    let chunk = state.chunks.get_chunk(id)?;
    Ok(Json((&chunk).into()))
}

pub async fn update_chunk(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ChunkUpdate>,
) -> IndexResult<Json<ChunkResponse>> {
    let chunk = state.chunks.update_chunk(id, update).await?;
    Ok(Json((&chunk).into()))
}

pub async fn delete_chunk(State(state): State<AppState>, Path(id): Path<Uuid>) -> IndexResult<StatusCode> {
    state.chunks.delete_chunk(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
