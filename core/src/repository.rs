//! Storage collaborator contract and its in-memory implementation.
//!
//! # Design
//! The service only ever talks to `dyn TodoRepository`, so the relational
//! store and the in-memory map are interchangeable. Each method is a single
//! storage call; there is no transaction spanning two calls, so concurrent
//! writers to the same id race and the last save wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::Todo;

/// Durable storage for todos with storage-assigned identity.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Insert when `todo.id == 0`, assigning a fresh id; otherwise upsert by id.
    async fn save(&self, todo: Todo) -> Result<Todo>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>>;

    /// Every todo in ascending id order.
    async fn find_all(&self) -> Result<Vec<Todo>>;

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Todo>>;

    /// Remove the todo if present. Absent ids are not an error.
    async fn delete_by_id(&self, id: i64) -> Result<()>;
}

#[derive(Debug, Default)]
struct Store {
    last_id: i64,
    todos: BTreeMap<i64, Todo>,
}

/// Process-local storage. Ids start at 1 and are never handed out twice,
/// even after the record holding one is deleted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn save(&self, mut todo: Todo) -> Result<Todo> {
        let mut store = self.store.write().await;
        if todo.is_new() {
            store.last_id += 1;
            todo.id = store.last_id;
        } else {
            store.last_id = store.last_id.max(todo.id);
        }
        store.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>> {
        Ok(self.store.read().await.todos.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Todo>> {
        Ok(self.store.read().await.todos.values().cloned().collect())
    }

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Todo>> {
        let store = self.store.read().await;
        Ok(store
            .todos
            .values()
            .filter(|todo| todo.completed == completed)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.store.write().await.todos.remove(&id);
        Ok(())
    }
}
