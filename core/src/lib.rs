//! Domain core for the to-do list application.
//!
//! # Overview
//! Holds the `Todo` entity, the input rules for the create/edit form, the
//! storage collaborator contract with in-memory and SQLite implementations,
//! and `TodoService`, which the HTTP layer calls.
//!
//! # Design
//! - Collaborators are injected as trait objects (`Arc<dyn TodoRepository>`,
//!   `Clock`); nothing is looked up from a global registry.
//! - Validation is an explicit function returning a field-to-message map and
//!   runs before the service is called; the service itself enforces only the
//!   existence rule for id-addressed operations.

pub mod clock;
pub mod error;
pub mod form;
pub mod repository;
pub mod service;
pub mod sqlite;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Result, TodoError};
pub use form::{FieldErrors, TodoForm, ValidTodo};
pub use repository::{InMemoryTodoRepository, TodoRepository};
pub use service::TodoService;
pub use sqlite::SqliteTodoRepository;
pub use types::{StatusFilter, Todo};
