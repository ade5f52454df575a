/// Label endpoints
///
/// # Endpoints
///
/// - `POST /label` - Create (201)
/// - `GET /label` - List the caller's labels
/// - `GET /label/:id` - Fetch one
/// - `PUT /label/:id` - Rename or recolor
/// - `DELETE /label/:id` - Delete and unlink from tasks

use crate::{
    app::AppState,
    error::{validate, ApiJson, ApiPath, ApiResult},
    response::ApiResponse,
    validation,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use taskdeck_shared::{auth::middleware::AuthContext, models::label::Label, services::LabelChanges};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLabelRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "validation::not_blank")
    )]
    pub name: String,

    #[validate(custom(function = "validation::color"))]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLabelRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "validation::not_blank")
    )]
    pub name: Option<String>,

    #[validate(custom(function = "validation::color"))]
    pub color: Option<String>,
}

pub async fn create_label(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateLabelRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Label>>)> {
    validate(&req)?;

    let label = state
        .labels
        .create(auth.user_id, &req.name, req.color.as_deref())
        .await?;

    Ok(ApiResponse::created("Label created successfully", label))
}

pub async fn list_labels(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ApiResponse<Vec<Label>>>> {
    let labels = state.labels.list(auth.user_id).await?;
    Ok(ApiResponse::data(labels))
}

pub async fn get_label(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<Label>>> {
    let label = state.labels.get(auth.user_id, id).await?;
    Ok(ApiResponse::data(label))
}

pub async fn update_label(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateLabelRequest>,
) -> ApiResult<Json<ApiResponse<Label>>> {
    validate(&req)?;

    let label = state
        .labels
        .update(
            auth.user_id,
            id,
            LabelChanges {
                name: req.name,
                color: req.color,
            },
        )
        .await?;

    Ok(ApiResponse::with_message("Label updated successfully", label))
}

pub async fn delete_label(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.labels.delete(auth.user_id, id).await?;
    Ok(ApiResponse::message("Label deleted successfully"))
}
