/// Database models for TaskDeck
///
/// Each model owns the SQL for its table. Every query function takes an
/// `impl PgExecutor`, so callers pass `&pool` for single statements and
/// `&mut *tx` when several writes must commit together.
///
/// # Models
///
/// - `user`: Accounts, verification state, OAuth linkage
/// - `password_reset_token`: One-time reset codes
/// - `project`: User-owned task groupings
/// - `task`: Tasks with status, priority, due date
/// - `subtask`: Checklist items under a task
/// - `label`: User-owned labels and the task/label join table
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::project::{NewProject, Project};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, user_id, NewProject {
///     name: "Home".to_string(),
///     description: None,
///     color: None,
/// }).await?;
///
/// let mine = Project::list_for_user(&pool, user_id).await?;
/// assert!(mine.iter().any(|p| p.id == project.id));
/// # Ok(())
/// # }
/// ```

pub mod label;
pub mod password_reset_token;
pub mod project;
pub mod subtask;
pub mod task;
pub mod user;
