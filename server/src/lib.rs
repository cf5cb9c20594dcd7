//! HTTP layer of the to-do list application.
//!
//! # Overview
//! Serves the server-rendered list at `/` and `/todos/...`, a JSON rendition
//! at `/api/todos/...`, and `/health`. Handlers call `todo_core::TodoService`;
//! failures outside form validation are turned into JSON by [`error::AppError`].
//!
//! # Design
//! - `AppState` carries the service and the clock; both are injected, so
//!   tests build the router over in-memory storage and a fixed date.
//! - Requests are stateless; the form is rebuilt from the request each time.

use std::future::Future;
use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use todo_core::{Clock, InMemoryTodoRepository, SqliteTodoRepository, SystemClock, TodoRepository, TodoService};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod telemetry;
pub mod view;

pub use config::{Config, Storage};
pub use error::{AppError, ErrorResponse};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: TodoService,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(service: TodoService, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }

    /// Fresh in-memory storage and the system clock.
    pub fn in_memory() -> Self {
        Self::new(
            TodoService::new(Arc::new(InMemoryTodoRepository::new())),
            Arc::new(SystemClock),
        )
    }

    /// State over the storage `config` selects.
    pub async fn from_config(config: &Config) -> todo_core::Result<Self> {
        let repository: Arc<dyn TodoRepository> = match &config.storage {
            Storage::Memory => Arc::new(InMemoryTodoRepository::new()),
            Storage::Sqlite(url) => Arc::new(SqliteTodoRepository::connect(url).await?),
        };
        Ok(Self::new(TodoService::new(repository), Arc::new(SystemClock)))
    }
}

pub fn app(state: AppState) -> Router {
    let todos = Router::new()
        .route("/", get(handlers::home))
        .route("/todos", get(handlers::list_all).post(handlers::create))
        .route("/todos/", get(handlers::redirect_to_list))
        .route("/todos/completed", get(handlers::list_completed))
        .route("/todos/incomplete", get(handlers::list_incomplete))
        .route("/todos/{id}", post(handlers::update))
        .route("/todos/{id}/edit", get(handlers::edit))
        .route("/todos/{id}/toggle", post(handlers::toggle))
        .route("/todos/{id}/delete", post(handlers::delete));

    let api = Router::new()
        .route("/api/todos", get(api::list).post(api::create))
        .route("/api/todos/{id}", get(api::show).put(api::update).delete(api::delete))
        .route("/api/todos/{id}/toggle", post(api::toggle));

    todos
        .merge(api)
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::correlation_id))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn run(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
