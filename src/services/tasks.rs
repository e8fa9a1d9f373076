use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::validation::parse_status;
use crate::models::{
    validate_and_normalize, Task, TaskCreateRequest, TaskDraft, TaskUpdateRequest,
    ValidationMode,
};
use crate::store::TaskStore;

/// Owner-scoped access to task records.
///
/// Every method takes the authenticated owner's id. A task that belongs to someone else is
/// reported exactly like one that does not exist.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Lists the owner's tasks, newest first. A non-empty `status_filter` must name a
    /// known status and is checked before the store is queried.
    pub async fn list(
        &self,
        owner_id: i32,
        status_filter: Option<&str>,
    ) -> Result<Vec<Task>, AppError> {
        let status = parse_status(status_filter)?;
        self.store.list_owned(owner_id, status).await
    }

    pub async fn create(
        &self,
        owner_id: i32,
        request: TaskCreateRequest,
    ) -> Result<Task, AppError> {
        let now = Utc::now();
        let draft = TaskDraft {
            title: request.title,
            description: request.description,
            status: request.status,
            due_date: request.due_date,
            user_id: owner_id,
        };
        let valid = validate_and_normalize(draft, ValidationMode::Create, now)?;

        let task = Task {
            id: Uuid::new_v4(),
            title: valid.title,
            description: valid.description,
            status: valid.status,
            due_date: valid.due_date,
            user_id: valid.user_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created = self.store.insert(&task).await?;
        log::info!("User {} created task {}", owner_id, created.id);
        Ok(created)
    }

    /// Fetches a task matching both `task_id` and `owner_id`.
    pub async fn get_owned(&self, owner_id: i32, task_id: Uuid) -> Result<Task, AppError> {
        self.store
            .find_owned(owner_id, task_id)
            .await?
            .ok_or_else(|| {
                log::debug!("Task {} not visible to user {}", task_id, owner_id);
                AppError::NotFound("Task not found".into())
            })
    }

    /// Applies the fields present in `request` to the stored task, re-validates the result
    /// and writes it back. The owner never changes.
    pub async fn update(
        &self,
        owner_id: i32,
        task_id: Uuid,
        request: TaskUpdateRequest,
    ) -> Result<Task, AppError> {
        let existing = self.get_owned(owner_id, task_id).await?;

        let mut draft = TaskDraft::from_task(&existing);
        draft.apply(&request);
        let now = Utc::now();
        let valid = validate_and_normalize(draft, ValidationMode::Update, now)?;

        let task = Task {
            title: valid.title,
            description: valid.description,
            status: valid.status,
            due_date: valid.due_date,
            updated_at: now,
            ..existing
        };

        let updated = self.store.update(&task).await?;
        log::info!("User {} updated task {}", owner_id, task_id);
        Ok(updated)
    }

    pub async fn delete(&self, owner_id: i32, task_id: Uuid) -> Result<(), AppError> {
        let existing = self.get_owned(owner_id, task_id).await?;

        if !self
            .store
            .soft_delete(owner_id, existing.id, Utc::now())
            .await?
        {
            return Err(AppError::NotFound("Task not found".into()));
        }
        log::info!("User {} deleted task {}", owner_id, task_id);
        Ok(())
    }
}
