//! Relational storage collaborator backed by SQLite.
//!
//! # Design
//! `AUTOINCREMENT` keeps SQLite from recycling the rowid of a deleted row, so
//! ids are never reused. Saves are a single `INSERT ... RETURNING` statement,
//! and updates go through `ON CONFLICT(id) DO UPDATE` so a save is an upsert
//! without a separate existence check.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::Result;
use crate::repository::TodoRepository;
use crate::types::Todo;

/// `TodoRepository` over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    /// Open (creating if missing) the database at `url` and ensure the schema.
    ///
    /// In-memory databases live only as long as their connection, so they get
    /// a single connection that is never recycled.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        let repository = Self::from_pool(pool);
        repository.migrate().await?;
        info!(url, "sqlite storage ready");
        Ok(repository)
    }

    /// Wrap an existing pool. Call `migrate` before first use.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply the migrations under `core/migrations`. Already applied ones are skipped.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn save(&self, todo: Todo) -> Result<Todo> {
        let saved = if todo.is_new() {
            sqlx::query_as::<_, Todo>(
                r#"
                INSERT INTO todos (title, due_date, completed)
                VALUES (?, ?, ?)
                RETURNING id, title, due_date, completed
                "#,
            )
            .bind(&todo.title)
            .bind(todo.due_date)
            .bind(todo.completed)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Todo>(
                r#"
                INSERT INTO todos (id, title, due_date, completed)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    due_date = excluded.due_date,
                    completed = excluded.completed
                RETURNING id, title, due_date, completed
                "#,
            )
            .bind(todo.id)
            .bind(&todo.title)
            .bind(todo.due_date)
            .bind(todo.completed)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            "SELECT id, title, due_date, completed FROM todos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn find_all(&self) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, due_date, completed FROM todos ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, due_date, completed FROM todos WHERE completed = ? ORDER BY id",
        )
        .bind(completed)
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
