/// Authentication service
///
/// Account lifecycle:
///
/// ```text
/// signup ──► unverified ──activate──► verified ──login──► session token
///               │   ▲
///               └───┘ resend_activation (new code, 7 days)
///
/// verified ──request_password_reset──► reset code (1 hour, single use)
///          ──complete_password_reset──► new password hash
/// ```
///
/// Emails are queued on the [`Notifier`] and never block or fail the
/// operation that produced them.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::auth::jwt::SessionSigner;
use crate::auth::password::{hash_password_async, verify_password_async};
use crate::auth::tokens::{generate_short_token, reset_token_ttl, verification_token_ttl};
use crate::db::{is_unique_violation, RESET_TOKEN_UNIQUE, USERS_EMAIL_UNIQUE};
use crate::models::password_reset_token::PasswordResetToken;
use crate::models::user::{normalize_email, NewUser, PublicUser, User};
use crate::notify::{templates, Notifier};

use super::error::ServiceError;

/// How many fresh codes to try when a reset code collides with a stored one
const RESET_TOKEN_ATTEMPTS: usize = 5;

/// Successful login: the sanitized user and a signed session token
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    pool: PgPool,
    signer: SessionSigner,
    notifier: Notifier,
    mail_from: String,
}

impl AuthService {
    pub fn new(pool: PgPool, signer: SessionSigner, notifier: Notifier, mail_from: impl Into<String>) -> Self {
        Self {
            pool,
            signer,
            notifier,
            mail_from: mail_from.into(),
        }
    }

    pub fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    /// Registers an unverified account and emails its verification code
    ///
    /// # Errors
    ///
    /// `EmailTaken` when the email is already registered, including when a
    /// concurrent signup wins the race on the unique index.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<PublicUser, ServiceError> {
        let email = normalize_email(email);

        if User::find_by_email(&self.pool, &email).await?.is_some() {
            return Err(ServiceError::EmailTaken);
        }

        let password_hash = hash_password_async(password.to_string()).await?;
        let token = generate_short_token();

        let user = User::create(
            &self.pool,
            NewUser {
                email: email.clone(),
                name,
                password_hash,
                verification_token: token.clone(),
                verification_expires: Utc::now() + verification_token_ttl(),
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e, USERS_EMAIL_UNIQUE) {
                ServiceError::EmailTaken
            } else {
                ServiceError::Database(e)
            }
        })?;

        info!(user_id = %user.id, "User signed up");

        self.notifier
            .enqueue(templates::verification_email(&self.mail_from, &user.email, &token));

        Ok(user.into())
    }

    /// Verifies the email of the account matching `email` and `token`
    ///
    /// The code is cleared on success, so replaying it fails with
    /// `InvalidToken`.
    pub async fn activate(&self, email: &str, token: &str) -> Result<PublicUser, ServiceError> {
        let user = User::find_by_verification_token(&self.pool, email, token)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        if user.verification_expired(Utc::now()) {
            return Err(ServiceError::TokenExpired);
        }

        let user = User::mark_verified(&self.pool, user.id).await?;
        info!(user_id = %user.id, "Email verified");

        Ok(user.into())
    }

    /// Issues a new verification code to an existing, unverified account
    ///
    /// Succeeds silently for unknown or already verified emails so the
    /// response does not reveal which emails are registered.
    pub async fn resend_activation(&self, email: &str) -> Result<(), ServiceError> {
        let Some(user) = User::find_by_email(&self.pool, email).await? else {
            debug!("Activation resend for unknown email");
            return Ok(());
        };

        if user.email_verified {
            debug!(user_id = %user.id, "Activation resend for verified account");
            return Ok(());
        }

        let token = generate_short_token();
        User::set_verification_token(&self.pool, user.id, &token, Utc::now() + verification_token_ttl())
            .await?;

        info!(user_id = %user.id, "Verification code reissued");
        self.notifier
            .enqueue(templates::verification_email(&self.mail_from, &user.email, &token));

        Ok(())
    }

    /// Checks credentials and issues a session token
    ///
    /// Checks run in this order: unknown email, unverified account,
    /// OAuth-only account, wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ServiceError> {
        let user = User::find_by_email(&self.pool, email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !user.email_verified {
            return Err(ServiceError::UnverifiedAccount);
        }

        let password_hash = match (&user.password_hash, user.oauth_provider) {
            (Some(hash), _) => hash.clone(),
            (None, Some(provider)) => return Err(ServiceError::OAuthAccountConflict { provider }),
            (None, None) => return Err(ServiceError::InvalidCredentials),
        };

        if !verify_password_async(password.to_string(), password_hash).await? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let user = User::record_login(&self.pool, user.id).await?;
        let token = self.signer.issue(user.id, &user.email)?;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            user: user.into(),
            token,
        })
    }

    /// Emails a one-hour reset code if the account exists
    ///
    /// Returns `Ok(())` whether or not the email is registered.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ServiceError> {
        let Some(user) = User::find_by_email(&self.pool, email).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let expires_at = Utc::now() + reset_token_ttl();
        let mut attempt = 0;
        let reset = loop {
            attempt += 1;
            let token = generate_short_token();

            match PasswordResetToken::create(&self.pool, user.id, &token, expires_at).await {
                Ok(reset) => break reset,
                Err(e) if is_unique_violation(&e, RESET_TOKEN_UNIQUE) && attempt < RESET_TOKEN_ATTEMPTS => {
                    debug!(attempt, "Reset code collision, retrying");
                }
                Err(e) if is_unique_violation(&e, RESET_TOKEN_UNIQUE) => {
                    return Err(ServiceError::Internal(
                        "could not allocate a unique reset code".to_string(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        };

        info!(user_id = %user.id, "Password reset code issued");
        self.notifier
            .enqueue(templates::password_reset_email(&self.mail_from, &user.email, &reset.token));

        Ok(())
    }

    /// Checks that `token` is an unused, unexpired reset code for `email`
    pub async fn validate_password_reset(&self, email: &str, token: &str) -> Result<(), ServiceError> {
        PasswordResetToken::find_usable(&self.pool, email, token, Utc::now())
            .await?
            .map(|_| ())
            .ok_or(ServiceError::InvalidOrExpiredToken)
    }

    /// Replaces the password and consumes the reset code in one transaction
    ///
    /// The token row is locked for the duration, so a code can complete at
    /// most one reset even under concurrent requests.
    pub async fn complete_password_reset(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        let reset = PasswordResetToken::find_usable_for_update(&mut *tx, email, token, Utc::now())
            .await?
            .ok_or(ServiceError::InvalidOrExpiredToken)?;

        let password_hash = hash_password_async(new_password.to_string()).await?;

        User::update_password(&mut *tx, reset.user_id, &password_hash).await?;
        PasswordResetToken::mark_used(&mut *tx, reset.id).await?;

        tx.commit().await?;

        info!(user_id = %reset.user_id, "Password reset completed");
        Ok(())
    }
}
