/// Session token issuance and verification
///
/// Session tokens are JWTs signed with HS256. They identify a user (`sub`)
/// and carry the email the user logged in with.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: Configurable, 24 hours by default
/// - **Validation**: Signature, expiration, not-before, and issuer checks
/// - **Secret Management**: The secret is injected through [`SessionSigner::new`],
///   never read from the environment here
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::jwt::SessionSigner;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let signer = SessionSigner::new("your-secret-key-at-least-32-bytes", Duration::hours(24));
/// let user_id = Uuid::new_v4();
///
/// let token = signer.issue(user_id, "user@example.com")?;
/// let claims = signer.verify(&token)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into and required from every session token
pub const ISSUER: &str = "taskdeck";

/// Default session lifetime
pub fn default_session_ttl() -> Duration {
    Duration::hours(24)
}

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "taskdeck")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `email`: Email address of the user at issuance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// User email (custom claim)
    pub email: String,

    /// Issuer - Always "taskdeck"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims that expire after `expires_in`
    pub fn new(user_id: Uuid, email: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            email: email.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }
}

/// Creates a JWT token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies the signature, `exp`, `nbf`, and that the issuer is "taskdeck".
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    // Session expiry is exact; no grace period
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Issues and verifies session tokens with an injected secret and lifetime
#[derive(Clone)]
pub struct SessionSigner {
    secret: String,
    ttl: Duration,
}

impl SessionSigner {
    /// Creates a signer
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Session lifetime applied to newly issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a signed session token for a user
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, email, self.ttl);
        create_token(&claims, &self.secret)
    }

    /// Verifies a session token and returns its claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        validate_token(token, &self.secret)
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "a@b.com", Duration::hours(1));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.iss, "taskdeck");
        assert!(claims.exp > Utc::now().timestamp());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_issue_and_verify() {
        let signer = SessionSigner::new(SECRET, default_session_ttl());
        let user_id = Uuid::new_v4();

        let token = signer.issue(user_id, "user@example.com").expect("Should issue token");
        let claims = signer.verify(&token).expect("Should verify token");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let signer = SessionSigner::new(SECRET, default_session_ttl());
        let other = SessionSigner::new("another-secret-key-at-least-32-bytes", default_session_ttl());

        let token = signer.issue(Uuid::new_v4(), "a@b.com").unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_verify_expired_token() {
        let signer = SessionSigner::new(SECRET, Duration::seconds(-3600));

        let token = signer.issue(Uuid::new_v4(), "a@b.com").unwrap();
        let result = signer.verify(&token);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_verify_rejects_foreign_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), "a@b.com", Duration::hours(1));
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::InvalidIssuer)));
    }

    #[test]
    fn test_verify_garbage() {
        let signer = SessionSigner::new(SECRET, default_session_ttl());
        assert!(matches!(
            signer.verify("not-a-jwt"),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let signer = SessionSigner::new(SECRET, default_session_ttl());
        let rendered = format!("{:?}", signer);
        assert!(!rendered.contains(SECRET));
    }
}
