//! The `Todo` entity and the list views over it.
//!
//! # Design
//! A `Todo` with `id == 0` has not been stored yet; the storage collaborator
//! assigns the identity on first save and the id never changes afterwards.
//! Mutation goes through `toggled` and `with_fields`, which return whole new
//! values, so a record is only ever replaced wholesale on save.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub due_date: NaiveDate,
    pub completed: bool,
}

impl Todo {
    /// An unsaved todo. Storage assigns the id; `completed` starts false.
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: 0,
            title: title.into(),
            due_date,
            completed: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    /// Copy with `completed` flipped.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copy with every mutable field replaced. The id is kept.
    pub fn with_fields(&self, title: impl Into<String>, due_date: NaiveDate, completed: bool) -> Self {
        Self {
            id: self.id,
            title: title.into(),
            due_date,
            completed,
        }
    }
}

/// Which slice of the list a page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl StatusFilter {
    /// The `completed` value this filter selects, or `None` for every todo.
    pub fn completed(self) -> Option<bool> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Completed => Some(true),
            StatusFilter::Incomplete => Some(false),
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            StatusFilter::All => "/todos",
            StatusFilter::Completed => "/todos/completed",
            StatusFilter::Incomplete => "/todos/incomplete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_todo_is_unsaved_and_incomplete() {
        let todo = Todo::new("Buy milk", date(2030, 1, 2));
        assert!(todo.is_new());
        assert_eq!(todo.id, 0);
        assert!(!todo.completed);
    }

    #[test]
    fn todo_serializes_with_camel_case_keys() {
        let todo = Todo {
            id: 7,
            title: "Test".to_string(),
            due_date: date(2030, 5, 1),
            completed: true,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["title"], "Test");
        assert_eq!(json["dueDate"], "2030-05-01");
        assert_eq!(json["completed"], true);
        assert!(json.get("due_date").is_none());
    }

    #[test]
    fn toggled_flips_only_completed() {
        let todo = Todo {
            id: 3,
            title: "Walk dog".to_string(),
            due_date: date(2030, 1, 1),
            completed: false,
        };
        let flipped = todo.toggled();
        assert!(flipped.completed);
        assert_eq!(flipped.id, 3);
        assert_eq!(flipped.title, "Walk dog");
        assert_eq!(flipped.toggled(), todo);
    }

    #[test]
    fn with_fields_keeps_id() {
        let todo = Todo {
            id: 11,
            title: "Old".to_string(),
            due_date: date(2030, 1, 1),
            completed: false,
        };
        let replaced = todo.with_fields("New", date(2031, 2, 3), true);
        assert_eq!(replaced.id, 11);
        assert_eq!(replaced.title, "New");
        assert_eq!(replaced.due_date, date(2031, 2, 3));
        assert!(replaced.completed);
    }

    #[test]
    fn status_filter_selects_completed_flag() {
        assert_eq!(StatusFilter::All.completed(), None);
        assert_eq!(StatusFilter::Completed.completed(), Some(true));
        assert_eq!(StatusFilter::Incomplete.completed(), Some(false));
        assert_eq!(StatusFilter::default(), StatusFilter::All);
    }
}
