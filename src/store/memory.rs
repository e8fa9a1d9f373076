use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskStatus, User};

#[derive(Default)]
struct State {
    users: Vec<User>,
    next_user_id: i32,
    /// Tasks in insertion order, so ties on `created_at` resolve newest-first.
    tasks: Vec<Task>,
}

/// In-process store implementing both [`UserStore`] and [`TaskStore`].
///
/// Keeps the same guarantees as the database schema: unique usernames and emails,
/// soft-deleted rows hidden from reads, newest tasks first.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalServerError("Memory store lock poisoned".into()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.lock()?;
        let taken = state
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(AppError::Conflict(
                "Username or email already registered".into(),
            ));
        }

        state.next_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: state.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .find(|u| u.username == username && u.deleted_at.is_none())
            .cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: &Task) -> Result<Task, AppError> {
        let mut state = self.lock()?;
        if state.tasks.iter().any(|t| t.id == task.id) {
            return Err(AppError::Conflict("Task already exists".into()));
        }
        state.tasks.push(task.clone());
        Ok(task.clone())
    }

    async fn list_owned(
        &self,
        owner_id: i32,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, AppError> {
        let state = self.lock()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .rev()
            .filter(|t| t.user_id == owner_id && !t.is_deleted())
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        // Stable sort keeps the reversed insertion order for equal timestamps.
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find_owned(&self, owner_id: i32, task_id: Uuid) -> Result<Option<Task>, AppError> {
        let state = self.lock()?;
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == task_id && t.user_id == owner_id && !t.is_deleted())
            .cloned())
    }

    async fn update(&self, task: &Task) -> Result<Task, AppError> {
        let mut state = self.lock()?;
        let stored = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id && t.user_id == task.user_id && !t.is_deleted())
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.status = task.status;
        stored.due_date = task.due_date;
        stored.updated_at = task.updated_at;
        Ok(stored.clone())
    }

    async fn soft_delete(
        &self,
        owner_id: i32,
        task_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        match state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id && t.user_id == owner_id && !t.is_deleted())
        {
            Some(task) => {
                task.deleted_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn task_for(owner: i32, title: &str, created_at: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            status: TaskStatus::Pending,
            due_date: None,
            user_id: owner,
            created_at,
            updated_at: created_at,
            deleted_at: None,
        }
    }

    #[actix_rt::test]
    async fn test_user_uniqueness() {
        let store = MemoryStore::new();
        let alice = UserStore::insert(&store, new_user("alice", "alice@x.com"))
            .await
            .unwrap();
        assert_eq!(alice.id, 1);

        let same_email = UserStore::insert(&store, new_user("alice2", "alice@x.com")).await;
        assert!(matches!(same_email, Err(AppError::Conflict(_))));

        let same_name = UserStore::insert(&store, new_user("alice", "other@x.com")).await;
        assert!(matches!(same_name, Err(AppError::Conflict(_))));

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.email, "alice@x.com");
        assert!(store.find_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_list_is_scoped_ordered_and_skips_deleted() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let older = task_for(1, "older", now - Duration::minutes(5));
        let newer = task_for(1, "newer", now);
        let foreign = task_for(2, "foreign", now);
        for task in [&older, &newer, &foreign] {
            TaskStore::insert(&store, task).await.unwrap();
        }

        let titles: Vec<String> = store
            .list_owned(1, None)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);

        assert!(store.soft_delete(1, newer.id, now).await.unwrap());
        assert!(!store.soft_delete(1, newer.id, now).await.unwrap());
        assert!(!store.soft_delete(1, foreign.id, now).await.unwrap());

        let remaining = store.list_owned(1, None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(store.find_owned(1, newer.id).await.unwrap().is_none());
        assert!(store.find_owned(1, foreign.id).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_status_filter() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut done = task_for(1, "done", now);
        done.status = TaskStatus::Completed;
        TaskStore::insert(&store, &done).await.unwrap();
        TaskStore::insert(&store, &task_for(1, "open", now)).await.unwrap();

        let completed = store
            .list_owned(1, Some(TaskStatus::Completed))
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].title, "done");
    }
}
