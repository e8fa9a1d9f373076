use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is done.
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parses a status after trimming and lower-casing it.
    ///
    /// Returns `None` for anything outside the three known statuses, including the
    /// empty string; callers decide what an empty status means.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
    }

    /// Display color used by clients to render the status.
    pub fn color(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "yellow",
            TaskStatus::InProgress => "blue",
            TaskStatus::Completed => "green",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a raw status string to its display color, falling back to gray for unknown values.
pub fn display_color(status: &str) -> &'static str {
    TaskStatus::parse(status).map_or("gray", |status| status.color())
}

/// Represents a task entity as stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task, trimmed and at most 200 characters.
    pub title: String,
    /// An optional description, trimmed and at most 1000 characters.
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    /// Identifier of the user who owns the task. Never changes after creation.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Deleted rows are invisible to every read.
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// True when the task has a due date in the past and is not completed yet.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && !self.is_completed(),
            None => false,
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn mark_as_completed(&mut self) {
        self.status = TaskStatus::Completed;
    }
}

/// A task together with the facts derived from its current fields.
///
/// This is what the API returns; the derived fields are computed on every response and
/// never stored.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub is_overdue: bool,
    pub is_completed: bool,
    pub status_color: String,
}

impl TaskView {
    pub fn at(task: Task, now: DateTime<Utc>) -> Self {
        Self {
            is_overdue: task.is_overdue_at(now),
            is_completed: task.is_completed(),
            status_color: task.status.color().to_string(),
            task,
        }
    }
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self::at(task, Utc::now())
    }
}

/// Payload for creating a task.
///
/// Fields are unvalidated until they pass through the task validator.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskCreateRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Payload for a partial update.
///
/// A missing field leaves the stored value alone. An empty string is treated the same
/// as a missing field, so a description cannot be cleared through this request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Query parameters accepted when listing tasks.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Exact-match status filter. Must name one of the known statuses when present.
    pub status: Option<String>,
}
