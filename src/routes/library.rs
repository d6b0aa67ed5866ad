use crate::domain::library::{LibraryCreate, LibraryResponse, LibraryUpdate};
use crate::error::IndexResult;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

pub async fn create_library(
    State(state): State<AppState>,
    Json(create): Json<LibraryCreate>,
) -> IndexResult<(StatusCode, Json<LibraryResponse>)> {
    let library = state.libraries.create_library(create)?;
    Ok((StatusCode::CREATED, Json((&library).into())))
}

pub async fn list_libraries(State(state): State<AppState>) -> Json<Vec<LibraryResponse>> {
    Json(state.libraries.list_libraries().iter().map(LibraryResponse::from).collect())
}

pub async fn get_library(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> IndexResult<Json<LibraryResponse>> {
    let library = state.libraries.get_library(id)?;
    Ok(Json((&library).into()))
}

pub async fn update_library(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<LibraryUpdate>,
) -> IndexResult<Json<LibraryResponse>> {
    let library = state.libraries.update_library(id, update).await?;
    Ok(Json((&library).into()))
}

pub async fn delete_library(State(state): State<AppState>, Path(id): Path<Uuid>) -> IndexResult<StatusCode> {
    state.libraries.delete_library(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
