/// Authentication and authorization utilities
///
/// This module provides the credential and token primitives for TaskDeck:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`tokens`]: 5-character hex codes for email verification and password reset
/// - [`jwt`]: Session token issuance and verification
/// - [`middleware`]: Bearer token extraction and the `AuthContext` extractor
/// - [`authorization`]: Per-user ownership checks
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::password::{hash_password, verify_password};
/// use taskdeck_shared::auth::jwt::SessionSigner;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Abcd123!")?;
/// assert!(verify_password("Abcd123!", &hash)?);
///
/// let signer = SessionSigner::new("a-secret-of-at-least-32-characters!!", Duration::hours(24));
/// let token = signer.issue(Uuid::new_v4(), "a@b.com")?;
/// let claims = signer.verify(&token)?;
/// assert_eq!(claims.email, "a@b.com");
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod tokens;
