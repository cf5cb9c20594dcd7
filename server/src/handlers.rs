//! Request handlers for the HTML surface.
//!
//! # Design
//! Each handler adapts one route to one service call. List views and the
//! edit page render the `index` page; create and update validate the form
//! first and either re-render it with inline errors (status 200, nothing
//! stored) or redirect to the list. Toggle and delete always redirect.
//! Unknown ids and malformed input go through the Error Mapper.

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::NaiveDate;
use serde::Deserialize;
use todo_core::{FieldErrors, StatusFilter, Todo, TodoForm};
use tracing::debug;

use crate::error::{AppError, ErrorKind};
use crate::view::{IndexPage, SUCCESS_MESSAGE};
use crate::AppState;

/// Where create and update land on success.
pub const SAVED_REDIRECT: &str = "/todos?success=true";
pub const LIST_PATH: &str = "/todos";

/// `?success=` flag on the list views. Only the truthy spellings show the
/// banner; empty or unrecognised values are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub success: Option<String>,
}

impl ListQuery {
    fn success(&self) -> bool {
        matches!(
            self.success.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("true" | "1" | "on" | "yes")
        )
    }
}

/// Fields posted by the create/edit form.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TodoFormInput {
    pub title: String,
    pub due_date: String,
    /// Checkbox value; absent when unchecked.
    pub completed: Option<String>,
}

impl TodoFormInput {
    fn into_form(self, id: Option<i64>) -> TodoForm {
        TodoForm {
            id,
            title: self.title,
            due_date: self.due_date,
            completed: matches!(self.completed.as_deref(), Some(v) if v != "false"),
        }
    }
}

// --- list views ---

pub async fn home(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> Result<Html<String>, AppError> {
    list_page(&state, StatusFilter::All, false, &uri).await
}

pub async fn list_all(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    let success = success_flag(query, &uri)?;
    list_page(&state, StatusFilter::All, success, &uri).await
}

pub async fn list_completed(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    let success = success_flag(query, &uri)?;
    list_page(&state, StatusFilter::Completed, success, &uri).await
}

pub async fn list_incomplete(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    let success = success_flag(query, &uri)?;
    list_page(&state, StatusFilter::Incomplete, success, &uri).await
}

/// `/todos/` is the list under another name.
pub async fn redirect_to_list() -> Redirect {
    Redirect::to(LIST_PATH)
}

// --- create / edit / update ---

pub async fn create(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    input: Result<Form<TodoFormInput>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(input) = input.map_err(|rejection| AppError::bad_request(rejection.body_text(), uri.path()))?;
    let form = input.into_form(None);

    match form.validate(state.clock.today()) {
        Ok(valid) => {
            state
                .service
                .create(valid.title, valid.due_date)
                .await
                .map_err(AppError::at(&uri))?;
            Ok(Redirect::to(SAVED_REDIRECT).into_response())
        }
        Err(errors) => rerender(&state, &form, &errors, &uri).await,
    }
}

pub async fn edit(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Html<String>, AppError> {
    let id = path_id(id, &uri)?;
    let todo = state.service.get_by_id(id).await.map_err(AppError::at(&uri))?;
    let todos = state.service.list_all().await.map_err(AppError::at(&uri))?;
    let form = TodoForm::from_todo(&todo);
    Ok(page(&todos, &form, &FieldErrors::new(), StatusFilter::All, None))
}

pub async fn update(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
    input: Result<Form<TodoFormInput>, FormRejection>,
) -> Result<Response, AppError> {
    let id = path_id(id, &uri)?;
    let Form(input) = input.map_err(|rejection| AppError::bad_request(rejection.body_text(), uri.path()))?;
    let form = input.into_form(Some(id));

    match form.validate(state.clock.today()) {
        Ok(valid) => {
            state
                .service
                .update(id, valid.title, valid.due_date, valid.completed)
                .await
                .map_err(AppError::at(&uri))?;
            Ok(Redirect::to(SAVED_REDIRECT).into_response())
        }
        Err(errors) => rerender(&state, &form, &errors, &uri).await,
    }
}

// --- toggle / delete ---

pub async fn toggle(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Redirect, AppError> {
    let id = path_id(id, &uri)?;
    state.service.toggle_status(id).await.map_err(AppError::at(&uri))?;
    Ok(Redirect::to(LIST_PATH))
}

pub async fn delete(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Redirect, AppError> {
    let id = path_id(id, &uri)?;
    state.service.delete(id).await.map_err(AppError::at(&uri))?;
    Ok(Redirect::to(LIST_PATH))
}

/// Liveness probe. Does not touch storage.
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// No route matches the path.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::new(ErrorKind::NotFound, format!("No route for {}", uri.path()), uri.path())
}

/// The path exists but not for this method.
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> AppError {
    AppError::new(
        ErrorKind::MethodNotAllowed,
        format!("Method {method} is not supported for {}", uri.path()),
        uri.path(),
    )
}

// --- helpers ---

/// The `{id}` path segment, or a 400 when it is not an integer.
pub(crate) fn path_id(id: Result<Path<i64>, PathRejection>, uri: &Uri) -> Result<i64, AppError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| AppError::bad_request(rejection.body_text(), uri.path()))
}

fn success_flag(query: Result<Query<ListQuery>, QueryRejection>, uri: &Uri) -> Result<bool, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::bad_request(rejection.body_text(), uri.path()))?;
    Ok(query.success())
}

fn tomorrow(today: NaiveDate) -> NaiveDate {
    today.succ_opt().unwrap_or(today)
}

async fn list_page(state: &AppState, filter: StatusFilter, success: bool, uri: &Uri) -> Result<Html<String>, AppError> {
    let todos = state.service.list(filter).await.map_err(AppError::at(uri))?;
    let form = TodoForm::blank(tomorrow(state.clock.today()));
    let message = success.then_some(SUCCESS_MESSAGE);
    Ok(page(&todos, &form, &FieldErrors::new(), filter, message))
}

/// Show a rejected form again, with the full list and nothing stored.
async fn rerender(state: &AppState, form: &TodoForm, errors: &FieldErrors, uri: &Uri) -> Result<Response, AppError> {
    debug!(?errors, path = uri.path(), "todo form rejected");
    let todos = state.service.list_all().await.map_err(AppError::at(uri))?;
    Ok(page(&todos, form, errors, StatusFilter::All, None).into_response())
}

fn page(todos: &[Todo], form: &TodoForm, errors: &FieldErrors, filter: StatusFilter, success: Option<&str>) -> Html<String> {
    Html(
        IndexPage {
            todos,
            form,
            errors,
            filter,
            success_message: success,
        }
        .render(),
    )
}
