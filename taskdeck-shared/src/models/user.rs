/// User model and database operations
///
/// A user signs up unverified, proves ownership of the email with a
/// 5-character verification code, then logs in with a password. Accounts
/// created through an OAuth provider may have no password at all.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255),
///     email VARCHAR(320) NOT NULL,          -- unique, stored lowercase
///     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     email_verification_token VARCHAR(5),
///     email_verification_token_expires TIMESTAMPTZ,
///     password_hash VARCHAR(255),           -- NULL for OAuth-only accounts
///     oauth_provider oauth_provider,
///     oauth_provider_id VARCHAR(255),
///     oauth_access_token TEXT,
///     oauth_refresh_token TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ,
///     CHECK (password_hash IS NOT NULL OR oauth_provider IS NOT NULL)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::user::{NewUser, User};
/// use chrono::{Duration, Utc};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, NewUser {
///     email: "user@example.com".to_string(),
///     name: None,
///     password_hash: "$argon2id$...".to_string(),
///     verification_token: "0a1b2".to_string(),
///     verification_expires: Utc::now() + Duration::days(7),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "user@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

/// External identity provider an account was created through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "oauth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
    Apple,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
            OAuthProvider::Apple => "apple",
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full user row, including secrets
///
/// Never serialize this directly; hand out [`PublicUser`] instead.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub email_verified: bool,
    pub email_verification_token: Option<String>,
    pub email_verification_token_expires: Option<DateTime<Utc>>,

    /// Argon2id PHC string, `None` for OAuth-only accounts
    pub password_hash: Option<String>,

    pub oauth_provider: Option<OAuthProvider>,
    pub oauth_provider_id: Option<String>,
    pub oauth_access_token: Option<String>,
    pub oauth_refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// User as returned to API callers: no hash, tokens, or OAuth secrets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub email_verified: bool,
    pub oauth_provider: Option<OAuthProvider>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            email_verified: user.email_verified,
            oauth_provider: user.oauth_provider,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Input for signup
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Already normalised with [`normalize_email`]
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub verification_token: String,
    pub verification_expires: DateTime<Utc>,
}

/// Canonical stored form of an email address: trimmed, lowercase
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Inserts an unverified user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users_email_idx` if the email is
    /// already registered.
    pub async fn create(executor: impl PgExecutor<'_>, data: NewUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                email, name, password_hash,
                email_verification_token, email_verification_token_expires
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.email)
        .bind(data.name)
        .bind(data.password_hash)
        .bind(data.verification_token)
        .bind(data.verification_expires)
        .fetch_one(executor)
        .await
    }

    /// Looks up a user by email (normalised before matching)
    pub async fn find_by_email(
        executor: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(executor)
            .await
    }

    /// Finds the user whose pending verification code is `token`
    ///
    /// Expiry is not checked here so the caller can tell a wrong code from
    /// an expired one.
    pub async fn find_by_verification_token(
        executor: impl PgExecutor<'_>,
        email: &str,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE email = $1 AND email_verification_token = $2
            "#,
        )
        .bind(normalize_email(email))
        .bind(token)
        .fetch_optional(executor)
        .await
    }

    /// Marks the email verified and clears the verification code
    pub async fn mark_verified(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email_verified = TRUE,
                email_verification_token = NULL,
                email_verification_token_expires = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Replaces the pending verification code
    pub async fn set_verification_token(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_verification_token = $2,
                email_verification_token_expires = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Stamps `last_login_at` and returns the refreshed row
    pub async fn record_login(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }

    pub async fn update_password(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// True when the stored verification code has lapsed at `now`
    pub fn verification_expired(&self, now: DateTime<Utc>) -> bool {
        match self.email_verification_token_expires {
            Some(expires) => now > expires,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
            email_verified: false,
            email_verification_token: Some("0a1b2".to_string()),
            email_verification_token_expires: Some(now + Duration::days(7)),
            password_hash: Some("$argon2id$v=19$...".to_string()),
            oauth_provider: None,
            oauth_provider_id: None,
            oauth_access_token: Some("secret-access".to_string()),
            oauth_refresh_token: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_public_user_hides_secrets() {
        let json = serde_json::to_value(PublicUser::from(user())).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj["email"], "ada@example.com");
        assert_eq!(obj["emailVerified"], false);
        for key in ["passwordHash", "emailVerificationToken", "oauthAccessToken", "password_hash"] {
            assert!(!obj.contains_key(key), "{key} leaked");
        }
    }

    #[test]
    fn test_oauth_provider_display() {
        assert_eq!(OAuthProvider::Github.to_string(), "github");
    }

    #[test]
    fn test_verification_expired() {
        let mut u = user();
        let now = Utc::now();
        assert!(!u.verification_expired(now));

        u.email_verification_token_expires = Some(now - Duration::seconds(1));
        assert!(u.verification_expired(now));

        u.email_verification_token_expires = None;
        assert!(u.verification_expired(now));
    }
}
