use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    pub fn next(&self) -> Status {
        match self {
            Status::Pending => Status::InProgress,
            Status::InProgress => Status::Completed,
            Status::Completed => Status::Pending,
        }
    }

    pub fn prev(&self) -> Status {
        match self {
            Status::Pending => Status::Completed,
            Status::InProgress => Status::Pending,
            Status::Completed => Status::InProgress,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when a string is not one of the three status values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid status: '{}' (must be one of: pending, in-progress, completed)",
            self.0
        )
    }
}

impl std::error::Error for InvalidStatus {}

impl FromStr for Status {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

/// A single to-do record, stored as `{ id, title, description, dueDate, status }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub status: Status,
}

impl Task {
    /// Due date as a calendar date, `None` when the text is not `YYYY-MM-DD`
    pub fn due(&self) -> Option<NaiveDate> {
        parse_due(&self.due_date)
    }
}

/// Parse a `YYYY-MM-DD` due date
pub fn parse_due(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Editable task fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    DueDate,
    Status,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Title, Field::Description, Field::DueDate, Field::Status];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::DueDate => "Due Date",
            Field::Status => "Status",
        }
    }

    pub fn next(&self) -> Field {
        match self {
            Field::Title => Field::Description,
            Field::Description => Field::DueDate,
            Field::DueDate => Field::Status,
            Field::Status => Field::Title,
        }
    }

    pub fn prev(&self) -> Field {
        match self {
            Field::Title => Field::Status,
            Field::Description => Field::Title,
            Field::DueDate => Field::Description,
            Field::Status => Field::DueDate,
        }
    }
}

/// Scratch copy of one task's fields while its row is being edited.
///
/// Only fields that are present override the task when the edit is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<Status>,
}

impl EditBuffer {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            description: Some(task.description.clone()),
            due_date: Some(task.due_date.clone()),
            status: Some(task.status),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Text value of a field, empty when the field is absent
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Title => self.title.as_deref().unwrap_or_default(),
            Field::Description => self.description.as_deref().unwrap_or_default(),
            Field::DueDate => self.due_date.as_deref().unwrap_or_default(),
            Field::Status => self.status.map(|s| s.as_str()).unwrap_or_default(),
        }
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = &self.due_date {
            task.due_date = due_date.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// Hands out strictly increasing ids seeded from the wall clock.
///
/// An id is never lower than the current time in milliseconds, never lower than
/// one past the last id issued, and never lower than one past the highest id seen
/// in the loaded collection.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: TaskId,
}

impl IdGenerator {
    pub fn seeded<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let last = tasks.into_iter().map(|t| t.id).max().unwrap_or(0);
        Self { last }
    }

    pub fn next_id(&mut self) -> TaskId {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&mut self, now_millis: TaskId) -> TaskId {
        let id = now_millis.max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}
