//! Storage seam for users and tasks.
//!
//! Services receive their stores as `Arc<dyn ...>` at construction. [`postgres`] backs the
//! running server; [`memory`] keeps everything in process and is used by the tests and by
//! local runs without a database. Both implementations hide soft-deleted rows from every
//! read.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskStatus, User};

pub use memory::MemoryStore;
pub use postgres::{PgTaskStore, PgUserStore};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new account. Fails with `AppError::Conflict` when the username or the
    /// email is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: &Task) -> Result<Task, AppError>;

    /// Tasks owned by `owner_id`, optionally filtered by status, most recent first.
    async fn list_owned(
        &self,
        owner_id: i32,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, AppError>;

    /// Looks a task up by id *and* owner.
    async fn find_owned(&self, owner_id: i32, task_id: Uuid) -> Result<Option<Task>, AppError>;

    /// Writes the mutable fields of an existing task back. The owner is part of the match,
    /// never of the update.
    async fn update(&self, task: &Task) -> Result<Task, AppError>;

    /// Marks a task as deleted. Returns `false` when nothing matched.
    async fn soft_delete(
        &self,
        owner_id: i32,
        task_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
}
