/// Ownership checks
///
/// Every project, task, and label belongs to exactly one user. A caller may
/// only see or change records they own.
///
/// # Policy
///
/// A record owned by someone else is reported exactly like a record that
/// does not exist (`AuthzError::NotFound`, rendered as 404), so responses
/// never reveal which ids exist.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::authorization::require_owner;
/// use taskdeck_shared::auth::middleware::AuthContext;
/// use taskdeck_shared::models::project::Project;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: &PgPool, auth: &AuthContext, id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let project = require_owner(Project::find_by_id(pool, id).await?, auth.user_id, "Project")?;
/// println!("{}", project.name);
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

/// Error type for ownership checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Record is missing or owned by another user
    #[error("{0} not found")]
    NotFound(&'static str),
}

/// A record with a single owning user
pub trait Owned {
    /// ID of the owning user
    fn owner_id(&self) -> Uuid;

    /// Whether `user_id` owns this record
    fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id() == user_id
    }
}

/// Returns the record if it exists and is owned by `user_id`
///
/// `kind` names the resource in the error message ("Project", "Task", ...).
pub fn require_owner<T: Owned>(
    record: Option<T>,
    user_id: Uuid,
    kind: &'static str,
) -> Result<T, AuthzError> {
    match record {
        Some(record) if record.is_owned_by(user_id) => Ok(record),
        Some(_) => {
            tracing::debug!(user_id = %user_id, kind, "Ownership check failed");
            Err(AuthzError::NotFound(kind))
        }
        None => Err(AuthzError::NotFound(kind)),
    }
}
