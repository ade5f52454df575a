/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Failures render as
///
/// ```json
/// { "ok": false, "error": "not_found", "message": "Task not found" }
/// ```
///
/// and field-level validation failures additionally carry
/// `"errors": [{ "field": "email", "message": "..." }]`.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::error::{ApiJson, ApiResult, validate};
/// use axum::Json;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct Rename {
///     #[validate(length(min = 1, max = 255))]
///     name: String,
/// }
///
/// async fn handler(ApiJson(req): ApiJson<Rename>) -> ApiResult<Json<String>> {
///     validate(&req)?;
///     Ok(Json(req.name))
/// }
/// ```

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{auth::middleware::AuthError, services::ServiceError};
use validator::{Validate, ValidationErrors};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid session token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Field validation failed (400)
    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    /// Domain failure from a service
    #[error(transparent)]
    Service(ServiceError),

    /// Unexpected failure (500); details are logged, not returned
    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub ok: bool,

    /// Machine-readable code, e.g. `"email_taken"`
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Service(err) => match err {
                ServiceError::EmailTaken
                | ServiceError::InvalidToken
                | ServiceError::TokenExpired
                | ServiceError::InvalidOrExpiredToken
                | ServiceError::OAuthAccountConflict { .. }
                | ServiceError::NoChanges
                | ServiceError::InvalidColor => StatusCode::BAD_REQUEST,
                ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                ServiceError::UnverifiedAccount => StatusCode::FORBIDDEN,
                ServiceError::NotFound(_) | ServiceError::InvalidReference(_) => StatusCode::NOT_FOUND,
                ServiceError::Database(_)
                | ServiceError::Password(_)
                | ServiceError::Jwt(_)
                | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Single-field validation failure
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: field.to_string(),
            message: message.into(),
        }])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, message, errors) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::ValidationError(errors) => {
                ("validation_error", "Validation failed".to_string(), Some(errors))
            }
            ApiError::Service(err) if err.is_internal() => {
                // Log internal errors but don't expose details to clients
                tracing::error!(error = %err, "Service failure");
                ("internal_error", "An internal error occurred".to_string(), None)
            }
            ApiError::Service(err) => (err.code(), err.to_string(), None),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            ok: false,
            error: error_code.to_string(),
            message,
            errors,
        });

        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Service(ServiceError::Database(err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Path rejected");
        ApiError::BadRequest("Invalid ID".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// `axum::Json` with rejections rendered as [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with rejections rendered as [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query` with rejections rendered as [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Runs `validator` rules, converting failures into a 400 response
pub fn validate<T: Validate>(req: &T) -> ApiResult<()> {
    req.validate().map_err(|e| ApiError::ValidationError(collect_details(&e)))
}

fn collect_details(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            let field = camel_case(field);
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.clone(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field)),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Field names are reported the way clients spell them
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
