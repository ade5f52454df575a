/// Business services
///
/// Services own the rules: ownership checks, transactional writes, token
/// lifecycles. The HTTP layer validates input shape, calls a service, and
/// renders the result.
///
/// - `auth`: Signup, verification, login, password reset
/// - `projects`, `tasks`, `labels`: Per-user resources
/// - `validation`: Format checks shared with the HTTP layer
/// - `error`: [`ServiceError`]

pub mod auth;
pub mod error;
pub mod labels;
pub mod projects;
pub mod tasks;
pub mod validation;

pub use auth::{AuthService, LoginOutcome};
pub use error::ServiceError;
pub use labels::{LabelChanges, LabelService};
pub use projects::{ProjectChanges, ProjectService};
pub use tasks::{CreateTask, SubtaskChanges, TaskChanges, TaskDetail, TaskService};
