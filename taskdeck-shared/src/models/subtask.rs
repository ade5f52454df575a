/// Subtasks: checklist items belonging to a task
///
/// Subtasks have no owner column; access is checked through the parent
/// task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: Uuid,
    pub title: String,
    pub is_completed: bool,
    pub task_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Subtask {
    pub async fn create(
        executor: impl PgExecutor<'_>,
        task_id: Uuid,
        title: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Subtask>(
            r#"
            INSERT INTO subtasks (title, task_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(task_id)
        .fetch_one(executor)
        .await
    }

    /// Finds a subtask only if it belongs to `task_id`
    pub async fn find_in_task(
        executor: impl PgExecutor<'_>,
        task_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subtask>("SELECT * FROM subtasks WHERE id = $1 AND task_id = $2")
            .bind(id)
            .bind(task_id)
            .fetch_optional(executor)
            .await
    }

    /// Subtasks of a task in creation order
    pub async fn list_for_task(executor: impl PgExecutor<'_>, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subtask>(
            r#"
            SELECT * FROM subtasks
            WHERE task_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }

    pub async fn update(executor: impl PgExecutor<'_>, subtask: &Subtask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Subtask>(
            r#"
            UPDATE subtasks
            SET title = $2, is_completed = $3, completed_at = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(subtask.id)
        .bind(&subtask.title)
        .bind(subtask.is_completed)
        .bind(subtask.completed_at)
        .fetch_one(executor)
        .await
    }

    pub async fn delete(executor: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_for_task(executor: impl PgExecutor<'_>, task_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subtasks WHERE task_id = $1")
            .bind(task_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Toggles completion, stamping or clearing `completed_at`
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        if completed && !self.is_completed {
            self.completed_at = Some(now);
        } else if !completed {
            self.completed_at = None;
        }
        self.is_completed = completed;
    }
}
