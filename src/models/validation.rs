//! Validation and normalization of task fields.
//!
//! Every task goes through [`validate_and_normalize`] right before it is written, both on
//! creation and on update. The storage layer never sees a task that has not passed here.

use chrono::{DateTime, Utc};
use std::fmt;

use super::task::{Task, TaskStatus, TaskUpdateRequest};
use crate::error::AppError;

pub const TITLE_MAX_LENGTH: usize = 200;
pub const DESCRIPTION_MAX_LENGTH: usize = 1000;

/// Whether the task being validated is new or already stored.
///
/// The due-date-in-the-past rule only applies to new tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

/// Task fields as they arrive, before normalization.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: i32,
}

impl TaskDraft {
    /// Starts a draft from a stored task so an update can be layered on top.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: Some(task.status.as_str().to_string()),
            due_date: task.due_date,
            user_id: task.user_id,
        }
    }

    /// Copies over the fields the update actually carries. Empty strings count as absent.
    pub fn apply(&mut self, update: &TaskUpdateRequest) {
        if let Some(title) = non_empty(&update.title) {
            self.title = title.to_string();
        }
        if let Some(description) = non_empty(&update.description) {
            self.description = Some(description.to_string());
        }
        if let Some(status) = non_empty(&update.status) {
            self.status = Some(status.to_string());
        }
        if update.due_date.is_some() {
            self.due_date = update.due_date;
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

/// Task fields after they passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    InvalidTitle(&'static str),
    DescriptionTooLong,
    InvalidStatus(String),
    DueDateInPast,
    MissingOwner,
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskValidationError::InvalidTitle(reason) => f.write_str(reason),
            TaskValidationError::DescriptionTooLong => write!(
                f,
                "Description cannot exceed {} characters",
                DESCRIPTION_MAX_LENGTH
            ),
            TaskValidationError::InvalidStatus(status) => write!(
                f,
                "Invalid status '{}'. Use: pending, in_progress or completed",
                status
            ),
            TaskValidationError::DueDateInPast => f.write_str("Due date cannot be in the past"),
            TaskValidationError::MissingOwner => f.write_str("Task owner is required"),
        }
    }
}

impl std::error::Error for TaskValidationError {}

impl From<TaskValidationError> for AppError {
    fn from(error: TaskValidationError) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Parses an optional status filter or status field.
///
/// `None` or an empty value yields `None`; anything else must be a known status.
pub fn parse_status(raw: Option<&str>) -> Result<Option<TaskStatus>, TaskValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => TaskStatus::parse(value)
            .map(Some)
            .ok_or_else(|| TaskValidationError::InvalidStatus(value.to_string())),
    }
}

/// Normalizes a draft and checks it against the task rules, in order:
/// title, description, status, due date (creation only), owner.
pub fn validate_and_normalize(
    draft: TaskDraft,
    mode: ValidationMode,
    now: DateTime<Utc>,
) -> Result<ValidTask, TaskValidationError> {
    let title = draft.title.trim().to_string();
    if title.is_empty() {
        return Err(TaskValidationError::InvalidTitle("Title is required"));
    }
    if title.chars().count() > TITLE_MAX_LENGTH {
        return Err(TaskValidationError::InvalidTitle(
            "Title cannot exceed 200 characters",
        ));
    }

    let description = draft
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if let Some(description) = &description {
        if description.chars().count() > DESCRIPTION_MAX_LENGTH {
            return Err(TaskValidationError::DescriptionTooLong);
        }
    }

    let status = parse_status(draft.status.as_deref())?.unwrap_or_default();

    if mode == ValidationMode::Create {
        if let Some(due) = draft.due_date {
            if due < now {
                return Err(TaskValidationError::DueDateInPast);
            }
        }
    }

    if draft.user_id == 0 {
        return Err(TaskValidationError::MissingOwner);
    }

    Ok(ValidTask {
        title,
        description,
        status,
        due_date: draft.due_date,
        user_id: draft.user_id,
    })
}
