/// Project endpoints
///
/// All routes require `Authorization: Bearer <token>`. A project owned by
/// another user answers 404, exactly like a missing one.
///
/// # Endpoints
///
/// - `POST /project` - Create (201)
/// - `GET /project` - List the caller's projects
/// - `GET /project/:id` - Fetch one
/// - `PUT /project/:id` - Partial update
/// - `DELETE /project/:id` - Delete; its tasks are kept and detached

use crate::{
    app::AppState,
    error::{validate, ApiJson, ApiPath, ApiResult},
    response::ApiResponse,
    routes::nullable,
    validation,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::project::{NewProject, Project},
    services::ProjectChanges,
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "validation::not_blank")
    )]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validation::color"))]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "validation::not_blank")
    )]
    pub name: Option<String>,

    /// `null` clears the description
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,

    #[validate(custom(function = "validation::color"))]
    pub color: Option<String>,
}

/// Create a project
///
/// # Endpoint
///
/// ```text
/// POST /project
/// Authorization: Bearer <token>
///
/// { "name": "Home", "description": "Chores", "color": "#22c55e" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid session token
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Project>>)> {
    validate(&req)?;

    let project = state
        .projects
        .create(
            auth.user_id,
            NewProject {
                name: req.name,
                description: req.description,
                color: req.color,
            },
        )
        .await?;

    Ok(ApiResponse::created("Project created successfully", project))
}

pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ApiResponse<Vec<Project>>>> {
    let projects = state.projects.list(auth.user_id).await?;
    Ok(ApiResponse::data(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<Project>>> {
    let project = state.projects.get(auth.user_id, id).await?;
    Ok(ApiResponse::data(project))
}

/// Update a project
///
/// Only supplied keys change.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or nothing would change
/// - `404 Not Found`: Missing or not the caller's
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateProjectRequest>,
) -> ApiResult<Json<ApiResponse<Project>>> {
    validate(&req)?;

    let project = state
        .projects
        .update(
            auth.user_id,
            id,
            ProjectChanges {
                name: req.name,
                description: req.description,
                color: req.color,
            },
        )
        .await?;

    Ok(ApiResponse::with_message("Project updated successfully", project))
}

/// Delete a project
///
/// Tasks in the project survive with `projectId` cleared.
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.projects.delete(auth.user_id, id).await?;
    Ok(ApiResponse::message("Project deleted successfully"))
}
