/// Password reset tokens
///
/// A reset code is a 5-character hex string, valid for one hour and usable
/// once. `used_at` is stamped in the same transaction that replaces the
/// password hash.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE password_reset_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token VARCHAR(5) NOT NULL,            -- unique
///     expires_at TIMESTAMPTZ NOT NULL,
///     used_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use super::user::normalize_email;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Stores a new reset code for `user_id`
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `password_reset_tokens_token_idx`
    /// when the code collides with an existing one.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(executor)
        .await
    }

    /// Finds an unused, unexpired code issued to the account with `email`
    pub async fn find_usable(
        executor: impl PgExecutor<'_>,
        email: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT t.*
            FROM password_reset_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE u.email = $1
              AND t.token = $2
              AND t.used_at IS NULL
              AND t.expires_at >= $3
            "#,
        )
        .bind(normalize_email(email))
        .bind(token)
        .bind(now)
        .fetch_optional(executor)
        .await
    }

    /// Same as [`find_usable`](Self::find_usable) but locks the row until
    /// the surrounding transaction ends
    ///
    /// Two concurrent resets with the same code serialise here; the second
    /// sees `used_at` set and finds nothing.
    pub async fn find_usable_for_update(
        executor: impl PgExecutor<'_>,
        email: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT t.*
            FROM password_reset_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE u.email = $1
              AND t.token = $2
              AND t.used_at IS NULL
              AND t.expires_at >= $3
            FOR UPDATE OF t
            "#,
        )
        .bind(normalize_email(email))
        .bind(token)
        .bind(now)
        .fetch_optional(executor)
        .await
    }

    pub async fn mark_used(executor: impl PgExecutor<'_>, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE password_reset_tokens SET used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(())
    }
}
