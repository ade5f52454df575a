/// Project service
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::require_owner;
use crate::models::project::{NewProject, Project};
use crate::models::task::Task;

use super::error::ServiceError;
use super::validation::check_color;

/// Partial update; `None` leaves a field unchanged
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
}

impl ProjectChanges {
    /// Applies the changes to a copy of `project`
    pub fn merge_into(self, project: &Project) -> Project {
        let mut merged = project.clone();
        if let Some(name) = self.name {
            merged.name = name;
        }
        if let Some(description) = self.description {
            merged.description = description;
        }
        if let Some(color) = self.color {
            merged.color = color;
        }
        merged
    }
}

#[derive(Debug, Clone)]
pub struct ProjectService {
    pool: PgPool,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, data: NewProject) -> Result<Project, ServiceError> {
        check_color(data.color.as_deref())?;

        let project = Project::create(&self.pool, user_id, data).await?;
        info!(user_id = %user_id, project_id = %project.id, "Project created");
        Ok(project)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Project>, ServiceError> {
        Ok(Project::list_for_user(&self.pool, user_id).await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Project, ServiceError> {
        let project = Project::find_by_id(&self.pool, id).await?;
        Ok(require_owner(project, user_id, "Project")?)
    }

    /// Merges `changes` over the stored project
    ///
    /// # Errors
    ///
    /// `NoChanges` when the merged project equals the stored one.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Project, ServiceError> {
        check_color(changes.color.as_deref())?;

        let current = self.get(user_id, id).await?;
        let merged = changes.merge_into(&current);

        if merged == current {
            return Err(ServiceError::NoChanges);
        }

        let project = Project::update(&self.pool, &merged).await?;
        info!(user_id = %user_id, project_id = %id, "Project updated");
        Ok(project)
    }

    /// Detaches the project's tasks and deletes it, atomically
    ///
    /// Returns how many tasks were detached.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<u64, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let project = Project::find_by_id(&mut *tx, id).await?;
        require_owner(project, user_id, "Project")?;

        let detached = Task::detach_from_project(&mut *tx, id).await?;
        Project::delete(&mut *tx, id).await?;

        tx.commit().await?;

        info!(user_id = %user_id, project_id = %id, detached, "Project deleted");
        Ok(detached)
    }
}
