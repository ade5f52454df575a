/// Task and subtask endpoints
///
/// All routes require `Authorization: Bearer <token>`.
///
/// # Endpoints
///
/// - `POST /task` - Create, optionally in a project and with labels (201)
/// - `GET /task?status=&priority=&projectId=` - List the caller's tasks
/// - `GET /task/:id` - Fetch one with subtasks and labels
/// - `PUT /task/:id`, `PATCH /task/:id` - Partial update
/// - `DELETE /task/:id` - Delete with its subtasks and label links
/// - `POST /task/:id/subtasks` - Add a subtask (201)
/// - `PATCH /task/:id/subtasks/:subtask_id` - Rename or toggle a subtask
/// - `DELETE /task/:id/subtasks/:subtask_id` - Remove a subtask

use crate::{
    app::AppState,
    error::{validate, ApiJson, ApiPath, ApiQuery, ApiResult},
    response::ApiResponse,
    routes::nullable,
    validation,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::{
        subtask::Subtask,
        task::{Task, TaskFilter, TaskPriority, TaskStatus},
    },
    services::{CreateTask, SubtaskChanges, TaskChanges, TaskDetail},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(
        length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"),
        custom(function = "validation::not_blank")
    )]
    pub title: String,

    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,

    #[serde(default)]
    pub label_ids: Vec<Uuid>,
}

/// Partial update; `null` clears `description`, `dueDate`, `projectId`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(
        length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"),
        custom(function = "validation::not_blank")
    )]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "nullable")]
    pub project_id: Option<Option<Uuid>>,

    /// Replaces every label on the task
    pub label_ids: Option<Vec<Uuid>>,
}

impl From<UpdateTaskRequest> for TaskChanges {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            project_id: req.project_id,
            label_ids: req.label_ids,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubtaskRequest {
    #[validate(
        length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"),
        custom(function = "validation::not_blank")
    )]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubtaskRequest {
    #[validate(
        length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"),
        custom(function = "validation::not_blank")
    )]
    pub title: Option<String>,

    pub is_completed: Option<bool>,
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /task
/// Authorization: Bearer <token>
///
/// {
///   "title": "Write report",
///   "priority": "high",
///   "dueDate": "2025-07-01T17:00:00Z",
///   "projectId": "uuid",
///   "labelIds": ["uuid"]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid session token
/// - `404 Not Found`: `projectId` or a label is missing or not the caller's;
///   nothing is created
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TaskDetail>>)> {
    validate(&req)?;

    let task = state
        .tasks
        .create(
            auth.user_id,
            CreateTask {
                title: req.title,
                description: req.description,
                status: req.status,
                priority: req.priority,
                due_date: req.due_date,
                project_id: req.project_id,
                label_ids: req.label_ids,
            },
        )
        .await?;

    Ok(ApiResponse::created("Task created successfully", task))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(filter): ApiQuery<TaskFilter>,
) -> ApiResult<Json<ApiResponse<Vec<Task>>>> {
    let tasks = state.tasks.list(auth.user_id, &filter).await?;
    Ok(ApiResponse::data(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<TaskDetail>>> {
    let task = state.tasks.get(auth.user_id, id).await?;
    Ok(ApiResponse::data(task))
}

/// Update a task (PUT and PATCH behave the same)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or no field supplied
/// - `404 Not Found`: Task, project, or label missing or not the caller's
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<ApiResponse<TaskDetail>>> {
    validate(&req)?;

    let task = state.tasks.update(auth.user_id, id, req.into()).await?;

    Ok(ApiResponse::with_message("Task updated successfully", task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.tasks.delete(auth.user_id, id).await?;
    Ok(ApiResponse::message("Task deleted successfully"))
}

pub async fn create_subtask(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateSubtaskRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Subtask>>)> {
    validate(&req)?;

    let subtask = state.tasks.add_subtask(auth.user_id, task_id, &req.title).await?;

    Ok(ApiResponse::created("Subtask created successfully", subtask))
}

pub async fn update_subtask(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((task_id, subtask_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdateSubtaskRequest>,
) -> ApiResult<Json<ApiResponse<Subtask>>> {
    validate(&req)?;

    let subtask = state
        .tasks
        .update_subtask(
            auth.user_id,
            task_id,
            subtask_id,
            SubtaskChanges {
                title: req.title,
                is_completed: req.is_completed,
            },
        )
        .await?;

    Ok(ApiResponse::data(subtask))
}

pub async fn delete_subtask(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath((task_id, subtask_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.tasks.delete_subtask(auth.user_id, task_id, subtask_id).await?;
    Ok(ApiResponse::message("Subtask deleted successfully"))
}
