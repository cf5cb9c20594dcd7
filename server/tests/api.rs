use std::sync::Arc;

use axum::http::{self, header, Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use todo_core::{FixedClock, InMemoryTodoRepository, Todo, TodoError, TodoRepository, TodoService};
use todo_server::{app, middleware::CORRELATION_ID_HEADER, view::SUCCESS_MESSAGE, AppState, ErrorResponse};
use tower::ServiceExt;

const FORM: &str = "application/x-www-form-urlencoded";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 15).unwrap()
}

fn state() -> AppState {
    AppState::new(
        TodoService::new(Arc::new(InMemoryTodoRepository::new())),
        Arc::new(FixedClock(today())),
    )
}

async fn send(state: &AppState, request: Request<String>) -> axum::response::Response {
    app(state.clone()).oneshot(request).await.unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_string(response: axum::response::Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn post(uri: &str) -> Request<String> {
    Request::builder().method("POST").uri(uri).body(String::new()).unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, FORM)
        .body(body.to_string())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

async fn seed(state: &AppState, title: &str) -> Todo {
    state
        .service
        .create(title, today().succ_opt().unwrap())
        .await
        .unwrap()
}

// --- list views ---

#[tokio::test]
async fn home_shows_empty_list_and_form_due_tomorrow() {
    let state = state();
    let resp = send(&state, get("/")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("No todos yet."));
    assert!(html.contains(r#"value="2030-06-16""#));
    assert!(html.contains(r#"action="/todos""#));
}

#[tokio::test]
async fn success_flag_shows_confirmation() {
    let state = state();

    let html = body_string(send(&state, get("/todos?success=true")).await).await;
    assert!(html.contains(SUCCESS_MESSAGE));

    let html = body_string(send(&state, get("/todos")).await).await;
    assert!(!html.contains(SUCCESS_MESSAGE));

    let html = body_string(send(&state, get("/todos/completed?success=true")).await).await;
    assert!(html.contains(SUCCESS_MESSAGE));
}

#[tokio::test]
async fn success_flag_accepts_one_and_ignores_empty_or_unknown() {
    let state = state();

    let resp = send(&state, get("/todos?success=1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains(SUCCESS_MESSAGE));

    for uri in ["/todos?success=", "/todos/incomplete?success=maybe", "/todos?success=false"] {
        let resp = send(&state, get(uri)).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        assert!(!body_string(resp).await.contains(SUCCESS_MESSAGE), "{uri}");
    }
}

#[tokio::test]
async fn filtered_views_show_matching_todos() {
    let state = state();
    seed(&state, "Still open").await;
    let done = seed(&state, "All finished").await;
    state.service.toggle_status(done.id).await.unwrap();

    let html = body_string(send(&state, get("/todos/completed")).await).await;
    assert!(html.contains("All finished"));
    assert!(!html.contains("Still open"));

    let html = body_string(send(&state, get("/todos/incomplete")).await).await;
    assert!(html.contains("Still open"));
    assert!(!html.contains("All finished"));

    let html = body_string(send(&state, get("/todos")).await).await;
    assert!(html.contains("Still open"));
    assert!(html.contains("All finished"));
}

#[tokio::test]
async fn trailing_slash_redirects_to_list() {
    let state = state();
    let resp = send(&state, get("/todos/")).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/todos");
}

// --- create ---

#[tokio::test]
async fn create_redirects_with_success_flag() {
    let state = state();
    let resp = send(&state, form_request("/todos", "title=Buy+milk&dueDate=2030-06-16")).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/todos?success=true");

    let todos = state.service.list_all().await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "Buy milk");
    assert_eq!(todos[0].due_date, NaiveDate::from_ymd_opt(2030, 6, 16).unwrap());
    assert!(!todos[0].completed);
}

#[tokio::test]
async fn create_ignores_completed_checkbox() {
    let state = state();
    send(&state, form_request("/todos", "title=Eager&dueDate=2030-06-15&completed=true")).await;

    let todos = state.service.list_all().await.unwrap();
    assert!(!todos[0].completed);
}

#[tokio::test]
async fn create_with_blank_title_rerenders_and_stores_nothing() {
    let state = state();
    seed(&state, "Existing item").await;

    let resp = send(&state, form_request("/todos", "title=++&dueDate=2030-06-16")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Title is required"));
    assert!(html.contains("Existing item"));
    assert!(html.contains(r#"value="2030-06-16""#));
    assert_eq!(state.service.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_with_past_due_date_rerenders_submitted_values() {
    let state = state();
    let resp = send(&state, form_request("/todos", "title=Too+late&dueDate=2030-06-14")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Due date must be today or later"));
    assert!(html.contains(r#"value="Too late""#));
    assert!(state.service.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_with_overlong_title_is_rejected() {
    let state = state();
    let body = format!("title={}&dueDate=2030-06-16", "a".repeat(101));
    let html = body_string(send(&state, form_request("/todos", &body)).await).await;

    assert!(html.contains("Title must be 100 characters or fewer"));
    assert!(state.service.list_all().await.unwrap().is_empty());
}

// --- edit / update ---

#[tokio::test]
async fn edit_prefills_form() {
    let state = state();
    let todo = seed(&state, "Edit me").await;

    let resp = send(&state, get(&format!("/todos/{}/edit", todo.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains(&format!(r#"action="/todos/{}""#, todo.id)));
    assert!(html.contains(r#"value="Edit me""#));
    assert!(html.contains(r#"value="2030-06-16""#));
}

#[tokio::test]
async fn edit_unknown_id_maps_to_404() {
    let state = state();
    let resp = send(&state, get("/todos/999/edit")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = body_json(resp).await;
    assert_eq!(body.status, 404);
    assert_eq!(body.error, "Not Found");
    assert_eq!(body.message, "Todo not found with id: 999");
    assert_eq!(body.path, "/todos/999/edit");
    assert!(body.errors.is_none());
}

#[tokio::test]
async fn non_numeric_id_maps_to_400() {
    let state = state();
    let resp = send(&state, get("/todos/abc/edit")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = body_json(resp).await;
    assert_eq!(body.error, "Bad Request");
    assert_eq!(body.path, "/todos/abc/edit");
}

#[tokio::test]
async fn update_replaces_fields_and_redirects() {
    let state = state();
    let todo = seed(&state, "Before").await;

    let resp = send(
        &state,
        form_request(
            &format!("/todos/{}", todo.id),
            "title=After&dueDate=2030-07-01&completed=true",
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/todos?success=true");

    let updated = state.service.get_by_id(todo.id).await.unwrap();
    assert_eq!(updated.id, todo.id);
    assert_eq!(updated.title, "After");
    assert_eq!(updated.due_date, NaiveDate::from_ymd_opt(2030, 7, 1).unwrap());
    assert!(updated.completed);
}

#[tokio::test]
async fn update_with_invalid_form_keeps_record() {
    let state = state();
    let todo = seed(&state, "Unchanged").await;

    let resp = send(&state, form_request(&format!("/todos/{}", todo.id), "title=&dueDate=")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Title is required"));
    assert!(html.contains("Due date is required"));
    assert!(html.contains(&format!(r#"action="/todos/{}""#, todo.id)));

    assert_eq!(state.service.get_by_id(todo.id).await.unwrap(), todo);
}

#[tokio::test]
async fn update_unknown_id_maps_to_404() {
    let state = state();
    let resp = send(&state, form_request("/todos/42", "title=Ghost&dueDate=2030-06-20")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = body_json(resp).await;
    assert_eq!(body.path, "/todos/42");
}

// --- toggle / delete ---

#[tokio::test]
async fn toggle_flips_and_redirects() {
    let state = state();
    let todo = seed(&state, "Flip me").await;

    let resp = send(&state, post(&format!("/todos/{}/toggle", todo.id))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/todos");
    assert!(state.service.get_by_id(todo.id).await.unwrap().completed);
}

#[tokio::test]
async fn toggle_unknown_id_maps_to_404() {
    let state = state();
    let resp = send(&state, post("/todos/7/toggle")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_and_redirects() {
    let state = state();
    let todo = seed(&state, "Remove me").await;

    let resp = send(&state, post(&format!("/todos/{}/delete", todo.id))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/todos");
    assert!(state.service.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_unknown_id_still_redirects() {
    let state = state();
    let resp = send(&state, post("/todos/31337/delete")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

// --- JSON API ---

#[tokio::test]
async fn api_create_returns_201() {
    let state = state();
    let resp = send(
        &state,
        json_request("POST", "/api/todos", r#"{"title":"Buy milk","dueDate":"2030-06-16"}"#),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
    assert_ne!(todo.id, 0);
}

#[tokio::test]
async fn api_validation_failure_lists_fields() {
    let state = state();
    let resp = send(&state, json_request("POST", "/api/todos", r#"{"title":""}"#)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = body_json(resp).await;
    assert_eq!(body.error, "Validation Error");
    assert_eq!(body.message, "Invalid input");
    assert_eq!(body.path, "/api/todos");
    let errors = body.errors.unwrap();
    assert_eq!(errors["title"], "Title is required");
    assert_eq!(errors["dueDate"], "Due date is required");
}

#[tokio::test]
async fn api_malformed_json_is_bad_request() {
    let state = state();
    let resp = send(&state, json_request("POST", "/api/todos", r#"{"title": 1"#)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = body_json(resp).await;
    assert_eq!(body.error, "Bad Request");
}

#[tokio::test]
async fn api_get_unknown_is_404() {
    let state = state();
    let resp = send(&state, get("/api/todos/5")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = body_json(resp).await;
    assert_eq!(body.message, "Todo not found with id: 5");
}

#[tokio::test]
async fn api_list_filters_by_completed() {
    let state = state();
    seed(&state, "Open").await;
    let done = seed(&state, "Done").await;
    state.service.toggle_status(done.id).await.unwrap();

    let all: Vec<Todo> = body_json(send(&state, get("/api/todos")).await).await;
    assert_eq!(all.len(), 2);

    let completed: Vec<Todo> = body_json(send(&state, get("/api/todos?completed=true")).await).await;
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, done.id);

    let incomplete: Vec<Todo> = body_json(send(&state, get("/api/todos?completed=false")).await).await;
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].title, "Open");
}

#[tokio::test]
async fn api_update_toggle_delete() {
    let state = state();
    let todo = seed(&state, "API item").await;
    let uri = format!("/api/todos/{}", todo.id);

    let resp = send(
        &state,
        json_request("PUT", &uri, r#"{"title":"Renamed","dueDate":"2030-08-01","completed":true}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.id, todo.id);
    assert_eq!(updated.title, "Renamed");
    assert!(updated.completed);

    let toggled: Todo = body_json(send(&state, post(&format!("{uri}/toggle"))).await).await;
    assert!(!toggled.completed);

    let resp = send(&state, Request::builder().method("DELETE").uri(&uri).body(String::new()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_string(resp).await.is_empty());

    let resp = send(&state, get(&uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_update_unknown_is_404() {
    let state = state();
    let resp = send(
        &state,
        json_request("PUT", "/api/todos/77", r#"{"title":"Nope","dueDate":"2030-06-20"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- unmatched requests and storage failures ---

#[tokio::test]
async fn unknown_route_maps_to_404_json() {
    let state = state();
    let resp = send(&state, get("/nope")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = body_json(resp).await;
    assert_eq!(body.status, 404);
    assert_eq!(body.error, "Not Found");
    assert_eq!(body.path, "/nope");
}

#[tokio::test]
async fn wrong_method_maps_to_405_json() {
    let state = state();
    let resp = send(&state, get("/todos/5")).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: ErrorResponse = body_json(resp).await;
    assert_eq!(body.status, 405);
    assert_eq!(body.error, "Method Not Allowed");
    assert_eq!(body.path, "/todos/5");
}

const STORAGE_DETAIL: &str = "disk image is malformed at page 7";

/// Storage whose every call fails.
struct BrokenRepository;

#[async_trait::async_trait]
impl TodoRepository for BrokenRepository {
    async fn save(&self, _todo: Todo) -> todo_core::Result<Todo> {
        Err(broken())
    }
    async fn find_by_id(&self, _id: i64) -> todo_core::Result<Option<Todo>> {
        Err(broken())
    }
    async fn find_all(&self) -> todo_core::Result<Vec<Todo>> {
        Err(broken())
    }
    async fn find_by_completed(&self, _completed: bool) -> todo_core::Result<Vec<Todo>> {
        Err(broken())
    }
    async fn delete_by_id(&self, _id: i64) -> todo_core::Result<()> {
        Err(broken())
    }
}

fn broken() -> TodoError {
    TodoError::Storage(sqlx::Error::Protocol(STORAGE_DETAIL.to_string()))
}

#[tokio::test]
async fn storage_failure_maps_to_500_without_details() {
    let state = AppState::new(
        TodoService::new(Arc::new(BrokenRepository)),
        Arc::new(FixedClock(today())),
    );

    for request in [
        get("/todos"),
        get("/api/todos/1"),
        form_request("/todos", "title=Walk&dueDate=2030-06-16"),
    ] {
        let resp = send(&state, request).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let raw = body_string(resp).await;
        assert!(!raw.contains(STORAGE_DETAIL));
        let body: ErrorResponse = serde_json::from_str(&raw).unwrap();
        assert_eq!(body.status, 500);
        assert_eq!(body.error, "Internal Server Error");
        assert_eq!(body.message, "An unexpected error occurred");
    }
}

// --- ambient ---

#[tokio::test]
async fn health_is_ok() {
    let state = state();
    let resp = send(&state, get("/health")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "ok");
}

#[tokio::test]
async fn correlation_id_is_echoed_or_generated() {
    let state = state();
    let id = "6f1c1a52-3a8e-4c1e-9b1e-2f3d4c5b6a79";
    let request = Request::builder()
        .uri("/health")
        .header(CORRELATION_ID_HEADER, id)
        .body(String::new())
        .unwrap();
    let resp = send(&state, request).await;
    assert_eq!(resp.headers()[CORRELATION_ID_HEADER], id);

    let resp = send(&state, get("/health")).await;
    let generated = resp.headers()[CORRELATION_ID_HEADER].to_str().unwrap();
    assert!(uuid_like(generated));
}

fn uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().filter(|c| *c == '-').count() == 4
}

// --- full lifecycle ---

#[tokio::test]
async fn html_lifecycle() {
    let state = state();

    let html = body_string(send(&state, get("/todos")).await).await;
    assert!(html.contains("No todos yet."));

    let resp = send(&state, form_request("/todos", "title=Test+Todo&dueDate=2030-06-16")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let todos = state.service.list_all().await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "Test Todo");
    assert!(!todos[0].completed);
    let id = todos[0].id;

    send(&state, post(&format!("/todos/{id}/toggle"))).await;
    assert!(state.service.get_by_id(id).await.unwrap().completed);
    let html = body_string(send(&state, get("/todos/completed")).await).await;
    assert!(html.contains("Test Todo"));

    send(&state, post(&format!("/todos/{id}/toggle"))).await;
    assert!(!state.service.get_by_id(id).await.unwrap().completed);

    send(&state, post(&format!("/todos/{id}/delete"))).await;
    let html = body_string(send(&state, get("/todos")).await).await;
    assert!(html.contains("No todos yet."));
    assert!(state.service.list_all().await.unwrap().is_empty());
}
