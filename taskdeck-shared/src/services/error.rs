/// Service error taxonomy
///
/// Every service operation fails with a [`ServiceError`]. The HTTP layer maps
/// each variant onto a status code; the `Display` text is the message shown
/// to the caller for every variant except the infrastructure ones
/// (`Database`, `Password`, `Jwt`, `Internal`), which are logged and
/// replaced with a generic message.

use crate::auth::{authorization::AuthzError, jwt::JwtError, password::PasswordError};
use crate::models::user::OAuthProvider;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Email already registered")]
    EmailTaken,

    /// No account matches the email and verification code
    #[error("Invalid token or email")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Please verify your email first")]
    UnverifiedAccount,

    /// Account has no password; it signs in through `provider`
    #[error("Please login with {provider}")]
    OAuthAccountConflict { provider: OAuthProvider },

    /// Password reset code is unknown, used, or expired
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// Record is missing or belongs to another user
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Input references a project or label the caller does not own
    #[error("{0}")]
    InvalidReference(String),

    #[error("No fields to update")]
    NoChanges,

    /// Color is not a hex or rgb()/hsl() value, or too long to store
    #[error("{}", super::validation::COLOR_ERROR)]
    InvalidColor,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Session token error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotFound(kind) => ServiceError::NotFound(kind),
        }
    }
}

impl ServiceError {
    /// Stable machine-readable code, used as the `error` field of responses
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::EmailTaken => "email_taken",
            ServiceError::InvalidToken => "invalid_token",
            ServiceError::TokenExpired => "token_expired",
            ServiceError::InvalidCredentials => "invalid_credentials",
            ServiceError::UnverifiedAccount => "unverified_account",
            ServiceError::OAuthAccountConflict { .. } => "oauth_account",
            ServiceError::InvalidOrExpiredToken => "invalid_or_expired_token",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::InvalidReference(_) => "invalid_reference",
            ServiceError::NoChanges => "no_changes",
            ServiceError::InvalidColor => "invalid_color",
            ServiceError::Database(_)
            | ServiceError::Password(_)
            | ServiceError::Jwt(_)
            | ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Whether the failure is an infrastructure fault rather than a caller error
    pub fn is_internal(&self) -> bool {
        self.code() == "internal_error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ServiceError::EmailTaken.to_string(), "Email already registered");
        assert_eq!(ServiceError::NotFound("Task").to_string(), "Task not found");
        assert_eq!(
            ServiceError::OAuthAccountConflict { provider: OAuthProvider::Google }.to_string(),
            "Please login with google"
        );
    }

    #[test]
    fn test_authz_maps_to_not_found() {
        let err: ServiceError = AuthzError::NotFound("Project").into();
        assert!(matches!(err, ServiceError::NotFound("Project")));
    }

    #[test]
    fn test_internal_classification() {
        assert!(ServiceError::Database(sqlx::Error::PoolTimedOut).is_internal());
        assert!(ServiceError::Internal("boom".to_string()).is_internal());
        assert!(!ServiceError::NoChanges.is_internal());
        assert!(!ServiceError::InvalidColor.is_internal());
    }
}
