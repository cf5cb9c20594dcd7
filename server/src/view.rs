//! HTML for the single `index` page.
//!
//! Every list view, the edit page and a rejected form submission render the
//! same page: filter links, an optional confirmation banner, the create or
//! edit form with inline field errors, and the list itself.

use std::fmt;

use todo_core::{
    form::{DUE_DATE_FIELD, TITLE_FIELD, TITLE_MAX_CHARS},
    FieldErrors, StatusFilter, Todo, TodoForm,
};

/// Banner shown after a successful create or update.
pub const SUCCESS_MESSAGE: &str = "Todo saved successfully";

/// Everything the `index` page shows.
#[derive(Debug)]
pub struct IndexPage<'a> {
    pub todos: &'a [Todo],
    pub form: &'a TodoForm,
    pub errors: &'a FieldErrors,
    pub filter: StatusFilter,
    pub success_message: Option<&'a str>,
}

impl IndexPage<'_> {
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn write_filters(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<nav class="filters">"#)?;
        for (filter, label) in [
            (StatusFilter::All, "All"),
            (StatusFilter::Completed, "Completed"),
            (StatusFilter::Incomplete, "Incomplete"),
        ] {
            let class = if filter == self.filter { r#" class="active""# } else { "" };
            writeln!(f, r#"<a href="{}"{class}>{label}</a>"#, filter.path())?;
        }
        writeln!(f, "</nav>")
    }

    fn write_form(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let form = self.form;
        let (action, heading, submit) = match form.id {
            Some(id) => (format!("/todos/{id}"), "Edit todo", "Save"),
            None => ("/todos".to_string(), "New todo", "Add"),
        };

        writeln!(f, r#"<form method="post" action="{action}" class="todo-form">"#)?;
        writeln!(f, "<h2>{heading}</h2>")?;

        writeln!(f, r#"<label for="{TITLE_FIELD}">Title</label>"#)?;
        writeln!(
            f,
            r#"<input type="text" id="{TITLE_FIELD}" name="{TITLE_FIELD}" value="{}" maxlength="{TITLE_MAX_CHARS}" required>"#,
            Escaped(&form.title)
        )?;
        self.write_field_error(f, TITLE_FIELD)?;

        writeln!(f, r#"<label for="{DUE_DATE_FIELD}">Due date</label>"#)?;
        writeln!(
            f,
            r#"<input type="date" id="{DUE_DATE_FIELD}" name="{DUE_DATE_FIELD}" value="{}">"#,
            Escaped(&form.due_date)
        )?;
        self.write_field_error(f, DUE_DATE_FIELD)?;

        if form.id.is_some() {
            let checked = if form.completed { " checked" } else { "" };
            writeln!(
                f,
                r#"<label><input type="checkbox" name="completed" value="true"{checked}> Completed</label>"#
            )?;
        }

        writeln!(f, r#"<button type="submit">{submit}</button>"#)?;
        if form.id.is_some() {
            writeln!(f, r#"<a href="/todos">Cancel</a>"#)?;
        }
        writeln!(f, "</form>")
    }

    fn write_field_error(&self, f: &mut fmt::Formatter<'_>, field: &str) -> fmt::Result {
        match self.errors.get(field) {
            Some(message) => writeln!(
                f,
                r#"<p class="field-error" data-field="{field}">{}</p>"#,
                Escaped(message)
            ),
            None => Ok(()),
        }
    }

    fn write_list(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.todos.is_empty() {
            return writeln!(f, r#"<p class="empty">No todos yet.</p>"#);
        }

        writeln!(f, r#"<ul class="todos">"#)?;
        for todo in self.todos {
            let (class, toggle_label) = if todo.completed {
                ("todo completed", "Mark incomplete")
            } else {
                ("todo", "Mark complete")
            };
            writeln!(f, r#"<li class="{class}" data-id="{}">"#, todo.id)?;
            writeln!(f, r#"<span class="title">{}</span>"#, Escaped(&todo.title))?;
            writeln!(f, r#"<span class="due">Due {}</span>"#, todo.due_date)?;
            writeln!(
                f,
                r#"<form method="post" action="/todos/{}/toggle"><button type="submit">{toggle_label}</button></form>"#,
                todo.id
            )?;
            writeln!(f, r#"<a href="/todos/{}/edit">Edit</a>"#, todo.id)?;
            writeln!(
                f,
                r#"<form method="post" action="/todos/{}/delete"><button type="submit">Delete</button></form>"#,
                todo.id
            )?;
            writeln!(f, "</li>")?;
        }
        writeln!(f, "</ul>")
    }
}

impl fmt::Display for IndexPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, r#"<html lang="en">"#)?;
        writeln!(f, r#"<head><meta charset="utf-8"><title>Todo List</title></head>"#)?;
        writeln!(f, "<body>")?;
        writeln!(f, "<main>")?;
        writeln!(f, "<h1>Todo List</h1>")?;
        if let Some(message) = self.success_message {
            writeln!(f, r#"<p class="success" role="status">{}</p>"#, Escaped(message))?;
        }
        self.write_filters(f)?;
        self.write_form(f)?;
        self.write_list(f)?;
        writeln!(f, "</main>")?;
        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

/// Displays its text with HTML metacharacters escaped.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                c => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}
