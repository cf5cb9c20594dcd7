//! JSON API over the same service, for callers that are not the HTML form.
//!
//! Validation failures here surface as a structured 400 with a field map
//! rather than a re-rendered page.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::{StatusCode, Uri},
    Json,
};
use serde::Deserialize;
use todo_core::{Todo, TodoError, TodoForm, ValidTodo};

use crate::error::AppError;
use crate::handlers::path_id;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub completed: Option<bool>,
}

/// Create/replace payload. Missing fields fail validation, not parsing.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TodoPayload {
    pub title: String,
    pub due_date: String,
    pub completed: bool,
}

pub async fn list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let Query(params) = params.map_err(|rejection| AppError::bad_request(rejection.body_text(), uri.path()))?;
    let todos = match params.completed {
        Some(completed) => state.service.list_by_status(completed).await,
        None => state.service.list_all().await,
    }
    .map_err(AppError::at(&uri))?;
    Ok(Json(todos))
}

pub async fn show(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Todo>, AppError> {
    let id = path_id(id, &uri)?;
    let todo = state.service.get_by_id(id).await.map_err(AppError::at(&uri))?;
    Ok(Json(todo))
}

pub async fn create(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<TodoPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let valid = validated(&state, payload, &uri)?;
    let todo = state
        .service
        .create(valid.title, valid.due_date)
        .await
        .map_err(AppError::at(&uri))?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TodoPayload>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let id = path_id(id, &uri)?;
    let valid = validated(&state, payload, &uri)?;
    let todo = state
        .service
        .update(id, valid.title, valid.due_date, valid.completed)
        .await
        .map_err(AppError::at(&uri))?;
    Ok(Json(todo))
}

pub async fn toggle(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Todo>, AppError> {
    let id = path_id(id, &uri)?;
    let todo = state.service.toggle_status(id).await.map_err(AppError::at(&uri))?;
    Ok(Json(todo))
}

pub async fn delete(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_id(id, &uri)?;
    state.service.delete(id).await.map_err(AppError::at(&uri))?;
    Ok(StatusCode::NO_CONTENT)
}

fn validated(
    state: &AppState,
    payload: Result<Json<TodoPayload>, JsonRejection>,
    uri: &Uri,
) -> Result<ValidTodo, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text(), uri.path()))?;
    let form = TodoForm {
        id: None,
        title: payload.title,
        due_date: payload.due_date,
        completed: payload.completed,
    };
    form.validate(state.clock.today())
        .map_err(TodoError::Validation)
        .map_err(AppError::at(uri))
}
