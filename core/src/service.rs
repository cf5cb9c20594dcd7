//! Todo service: the operations the HTTP layer calls.
//!
//! # Design
//! The service owns the one domain rule, that addressing an unknown id fails
//! with `NotFound`, and otherwise forwards to the storage collaborator. Each
//! operation is at most one read followed by one write with no locking in
//! between; concurrent updates of the same todo are last-write-wins.
//! `delete` forwards straight to storage and so succeeds for unknown ids.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{Result, TodoError};
use crate::repository::TodoRepository;
use crate::types::{StatusFilter, Todo};

/// Todo operations over an injected storage collaborator.
#[derive(Clone)]
pub struct TodoService {
    repository: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }

    /// Every stored todo, in storage order.
    pub async fn list_all(&self) -> Result<Vec<Todo>> {
        let todos = self.repository.find_all().await?;
        debug!(count = todos.len(), "listed todos");
        Ok(todos)
    }

    pub async fn list_by_status(&self, completed: bool) -> Result<Vec<Todo>> {
        let todos = self.repository.find_by_completed(completed).await?;
        debug!(completed, count = todos.len(), "listed todos by status");
        Ok(todos)
    }

    /// The todos a list view shows.
    pub async fn list(&self, filter: StatusFilter) -> Result<Vec<Todo>> {
        match filter.completed() {
            Some(completed) => self.list_by_status(completed).await,
            None => self.list_all().await,
        }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Todo> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))
    }

    /// Store a new, incomplete todo and return it with its assigned id.
    pub async fn create(&self, title: impl Into<String>, due_date: NaiveDate) -> Result<Todo> {
        let todo = self.repository.save(Todo::new(title, due_date)).await?;
        info!(id = todo.id, "created todo");
        Ok(todo)
    }

    /// Replace title, due date and completion of an existing todo.
    pub async fn update(
        &self,
        id: i64,
        title: impl Into<String>,
        due_date: NaiveDate,
        completed: bool,
    ) -> Result<Todo> {
        let existing = self.get_by_id(id).await?;
        let todo = self
            .repository
            .save(existing.with_fields(title, due_date, completed))
            .await?;
        info!(id, completed, "updated todo");
        Ok(todo)
    }

    pub async fn toggle_status(&self, id: i64) -> Result<Todo> {
        let existing = self.get_by_id(id).await?;
        let todo = self.repository.save(existing.toggled()).await?;
        info!(id, completed = todo.completed, "toggled todo");
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repository.delete_by_id(id).await?;
        info!(id, "deleted todo");
        Ok(())
    }
}
