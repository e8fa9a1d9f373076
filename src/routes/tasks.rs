use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TaskCreateRequest, TaskQuery, TaskUpdateRequest, TaskView},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response body of `GET /tasks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskView>,
    pub count: usize,
}

/// Response body of `DELETE /tasks/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `status` (optional): `pending`, `in_progress` or `completed`. Any other non-empty
///   value is rejected with `400`.
///
/// ## Responses:
/// - `200 OK`: `{"tasks": [...], "count": n}`, newest first.
/// - `400 Bad Request`: Unknown status filter.
/// - `401 Unauthorized`: Missing or invalid bearer token.
#[get("")]
pub async fn list_tasks(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let found = tasks.list(user.id, query.status.as_deref()).await?;

    let now = Utc::now();
    let views: Vec<TaskView> = found.into_iter().map(|t| TaskView::at(t, now)).collect();

    Ok(HttpResponse::Ok().json(TaskListResponse {
        count: views.len(),
        tasks: views,
    }))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: required, at most 200 characters after trimming.
/// - `description` (optional): at most 1000 characters after trimming.
/// - `status` (optional): defaults to `pending`.
/// - `due_date` (optional): RFC 3339 timestamp, must not be in the past.
///
/// ## Responses:
/// - `201 Created`: The stored task with its derived fields.
/// - `400 Bad Request`: A field failed validation.
/// - `401 Unauthorized`: Missing or invalid bearer token.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskCreateRequest>,
) -> Result<impl Responder, AppError> {
    let task = tasks.create(user.id, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(TaskView::from(task)))
}

/// Retrieves one of the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: The task with its derived fields.
/// - `401 Unauthorized`: Missing or invalid bearer token.
/// - `404 Not Found`: No such task, or it belongs to someone else.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get_owned(user.id, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TaskView::from(task)))
}

/// Partially updates one of the authenticated user's tasks.
///
/// Only the fields present in the body (and not empty) are changed. The result is
/// validated again before it is stored; a due date in the past is accepted here.
///
/// ## Responses:
/// - `200 OK`: The updated task.
/// - `400 Bad Request`: The updated task failed validation.
/// - `401 Unauthorized`: Missing or invalid bearer token.
/// - `404 Not Found`: No such task, or it belongs to someone else.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdateRequest>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update(user.id, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(TaskView::from(task)))
}

/// Soft-deletes one of the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task deleted"}`.
/// - `401 Unauthorized`: Missing or invalid bearer token.
/// - `404 Not Found`: No such task, or it belongs to someone else.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    tasks.delete(user.id, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Task deleted".to_string(),
    }))
}
