/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/signup` - Register (201)
/// - `POST /auth/activation` - Verify email with the 5-character code (201)
/// - `POST /auth/activation/resend` - Reissue the verification code (200)
/// - `POST /auth/login` - Exchange credentials for a session token (200)
/// - `POST /auth/password-reset/request` - Email a reset code (always 200)
/// - `POST /auth/password-reset/validate` - Check a reset code (200)
/// - `POST /auth/password-reset/complete` - Set a new password (200)

use crate::{
    app::AppState,
    error::{validate, ApiJson, ApiResult},
    response::ApiResponse,
    validation,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use taskdeck_shared::{models::user::PublicUser, services::LoginOutcome};
use validator::Validate;

/// Reply to every reset request, whether or not the account exists
pub const RESET_REQUESTED_MESSAGE: &str =
    "If an account exists with this email, a password reset code has been sent";

/// Reply to every activation resend, whether or not the account exists
pub const RESEND_MESSAGE: &str =
    "If an unverified account exists with this email, a new activation code has been sent";

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    #[validate(custom(function = "validation::password"))]
    pub password: String,

    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ActivationRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    #[validate(custom(function = "validation::short_token"))]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetValidateRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    #[validate(custom(function = "validation::short_token"))]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetCompleteRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    #[validate(custom(function = "validation::short_token"))]
    pub token: String,

    #[validate(custom(function = "validation::password"))]
    pub new_password: String,
}

/// Register a new, unverified account
///
/// # Endpoint
///
/// ```text
/// POST /auth/signup
/// Content-Type: application/json
///
/// { "email": "a@b.com", "password": "Abcd123!" }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "ok": true,
///   "message": "Account created successfully. Please check your email for verification.",
///   "data": { "id": "uuid", "email": "a@b.com", "emailVerified": false, ... }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or email already registered
/// - `500 Internal Server Error`: Server error
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<PublicUser>>)> {
    validate(&req)?;

    let user = state.auth.signup(&req.email, &req.password, req.name).await?;

    Ok(ApiResponse::created(
        "Account created successfully. Please check your email for verification.",
        user,
    ))
}

/// Verify an email address
///
/// # Errors
///
/// - `400 Bad Request`: Unknown email/code pair, or the code expired
pub async fn activate(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ActivationRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<()>>)> {
    validate(&req)?;

    state.auth.activate(&req.email, &req.token).await?;

    Ok((StatusCode::CREATED, ApiResponse::message("Account verified successfully")))
}

/// Reissue a verification code
///
/// Always answers with the same message so callers cannot probe which
/// emails are registered.
pub async fn resend_activation(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    validate(&req)?;

    state.auth.resend_activation(&req.email).await?;

    Ok(ApiResponse::message(RESEND_MESSAGE))
}

/// Log in
///
/// # Response (200)
///
/// ```json
/// { "ok": true, "message": "Login successful", "data": { "user": { ... }, "token": "eyJ..." } }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `403 Forbidden`: Email not verified yet
/// - `400 Bad Request`: Account signs in through an OAuth provider
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginOutcome>>> {
    validate(&req)?;

    let outcome = state.auth.login(&req.email, &req.password).await?;

    Ok(ApiResponse::with_message("Login successful", outcome))
}

/// Request a password reset code
pub async fn request_password_reset(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    validate(&req)?;

    state.auth.request_password_reset(&req.email).await?;

    Ok(ApiResponse::message(RESET_REQUESTED_MESSAGE))
}

/// Check a password reset code without consuming it
pub async fn validate_password_reset(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResetValidateRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    validate(&req)?;

    state.auth.validate_password_reset(&req.email, &req.token).await?;

    Ok(ApiResponse::message("Token is valid"))
}

/// Set a new password with a reset code
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the code is unknown, used, or expired
pub async fn complete_password_reset(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResetCompleteRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    validate(&req)?;

    state
        .auth
        .complete_password_reset(&req.email, &req.token, &req.new_password)
        .await?;

    Ok(ApiResponse::message("Password has been reset successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let ok = SignupRequest {
            email: "a@b.com".to_string(),
            password: "Abcd123!".to_string(),
            name: None,
        };
        assert!(ok.validate().is_ok());

        let bad = SignupRequest {
            email: "not-an-email".to_string(),
            password: "weak".to_string(),
            name: None,
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_reset_complete_uses_camel_case() {
        let req: ResetCompleteRequest = serde_json::from_value(serde_json::json!({
            "email": "a@b.com",
            "token": "0a1b2",
            "newPassword": "Abcd123!"
        }))
        .unwrap();

        assert_eq!(req.new_password, "Abcd123!");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_email_error_text() {
        let req = EmailRequest { email: "nope".to_string() };
        let errors = req.validate().unwrap_err();
        let message = errors.field_errors()["email"][0].message.clone().unwrap();
        assert_eq!(message, crate::validation::EMAIL_ERROR);
    }
}
