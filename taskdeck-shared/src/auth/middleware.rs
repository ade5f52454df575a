/// Bearer authentication for Axum
///
/// The API server runs [`authenticate`] in a route layer for every
/// protected router. On success the resulting [`AuthContext`] is stored in
/// the request extensions, and handlers take it as an extractor argument.
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get};
/// use taskdeck_shared::auth::middleware::AuthContext;
///
/// async fn protected_handler(auth: AuthContext) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let app: Router = Router::new().route("/protected", get(protected_handler));
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{JwtError, SessionSigner};

/// Identity of the caller, resolved from a verified session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email carried by the session token
    pub email: String,
}

/// Error type for bearer authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Authorization header missing")]
    MissingCredentials,

    /// Header present but not of the form `Bearer <token>`
    #[error("Token missing")]
    MissingToken,

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "ok": false,
            "error": "unauthorized",
            "message": self.to_string(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            _ => AuthError::InvalidToken("Invalid token".to_string()),
        }
    }
}

/// Resolves the caller from the `Authorization: Bearer <token>` header
///
/// # Errors
///
/// - `MissingCredentials` when the header is absent or not valid UTF-8
/// - `MissingToken` when the header has no bearer token
/// - `InvalidToken` when the signature, issuer, or expiry check fails
pub fn authenticate(headers: &HeaderMap, signer: &SessionSigner) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let claims = signer.verify(token)?;

    Ok(AuthContext {
        user_id: claims.sub,
        email: claims.email,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}
