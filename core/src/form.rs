//! Create/edit form data and its validation rules.
//!
//! # Design
//! `TodoForm` is scratch data for the page: it holds what the user typed,
//! including a due date that may not parse, so a rejected submission can be
//! echoed back unchanged. `validate` is the only way to turn it into values
//! the service accepts, and reports at most one message per field.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Todo;

/// Longest accepted title, in characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// Wire name of the title field.
pub const TITLE_FIELD: &str = "title";
/// Wire name of the due date field.
pub const DUE_DATE_FIELD: &str = "dueDate";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field name to error message, ordered by field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Form state behind the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoForm {
    pub id: Option<i64>,
    pub title: String,
    pub due_date: String,
    pub completed: bool,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTodo {
    pub title: String,
    pub due_date: NaiveDate,
    pub completed: bool,
}

impl TodoForm {
    /// Empty create form with the given due date pre-filled.
    pub fn blank(default_due: NaiveDate) -> Self {
        Self {
            due_date: format_date(default_due),
            ..Self::default()
        }
    }

    /// Edit form pre-filled from a stored todo.
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            id: Some(todo.id),
            title: todo.title.clone(),
            due_date: format_date(todo.due_date),
            completed: todo.completed,
        }
    }

    /// Check every field against the input rules.
    ///
    /// `today` is the earliest due date accepted.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidTodo, FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Some(message) = title_error(&self.title) {
            errors.insert(TITLE_FIELD.to_string(), message.to_string());
        }

        let due_date = match parse_due_date(&self.due_date, today) {
            Ok(date) => Some(date),
            Err(message) => {
                errors.insert(DUE_DATE_FIELD.to_string(), message.to_string());
                None
            }
        };

        match due_date {
            Some(due_date) if errors.is_empty() => Ok(ValidTodo {
                title: self.title.clone(),
                due_date,
                completed: self.completed,
            }),
            _ => Err(errors),
        }
    }
}

fn title_error(title: &str) -> Option<&'static str> {
    if title.trim().is_empty() {
        Some("Title is required")
    } else if title.chars().count() > TITLE_MAX_CHARS {
        Some("Title must be 100 characters or fewer")
    } else {
        None
    }
}

fn parse_due_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Due date is required");
    }
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| "Due date must be a valid date")?;
    if date < today {
        return Err("Due date must be today or later");
    }
    Ok(date)
}

/// `YYYY-MM-DD`, the format date inputs submit.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
