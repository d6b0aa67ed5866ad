use crate::domain::document::{DocumentCreate, DocumentResponse, DocumentUpdate};
use crate::error::IndexResult;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

pub async fn create_document(
    State(state): State<AppState>,
    Query(create): Query<DocumentCreate>,
) -> IndexResult<(StatusCode, Json<DocumentResponse>)> {
    let document = state.documents.create_document(create).await?;
    Ok((StatusCode::CREATED, Json((&document).into())))
}

pub async fn list_documents(State(state): State<AppState>) -> Json<Vec<DocumentResponse>> {
    Json(state.documents.list_documents().iter().map(DocumentResponse::from).collect())
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> IndexResult<Json<DocumentResponse>> {
    let document = state.documents.get_document(id)?;
    Ok(Json((&document).into()))
}

pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<DocumentUpdate>,
) -> IndexResult<Json<DocumentResponse>> {
    let document = state.documents.update_document(id, update).await?;
    Ok(Json((&document).into()))
}

pub async fn delete_document(State(state): State<AppState>, Path(id): Path<Uuid>) -> IndexResult<StatusCode> {
    state.documents.delete_document(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
