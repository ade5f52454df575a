/// Labels and task/label links
///
/// # Schema
///
/// ```sql
/// CREATE TABLE labels (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     color VARCHAR(64) NOT NULL DEFAULT '#94a3b8',
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_labels (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     label_id UUID NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX task_labels_unique_idx ON task_labels (task_id, label_id);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::auth::authorization::Owned;

pub const DEFAULT_LABEL_COLOR: &str = "#94a3b8";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Label {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Label {
    pub async fn create(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
        name: &str,
        color: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            r#"
            INSERT INTO labels (name, color, user_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(color.unwrap_or(DEFAULT_LABEL_COLOR))
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The user's labels sorted by name
    pub async fn list_for_user(executor: impl PgExecutor<'_>, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            r#"
            SELECT * FROM labels
            WHERE user_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    pub async fn update(executor: impl PgExecutor<'_>, label: &Label) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            r#"
            UPDATE labels
            SET name = $2, color = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(label.id)
        .bind(&label.name)
        .bind(&label.color)
        .fetch_one(executor)
        .await
    }

    pub async fn delete(executor: impl PgExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts how many of `ids` exist and belong to `user_id`
    ///
    /// `ids` must be free of duplicates for the count to be meaningful.
    pub async fn count_owned(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM labels WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id)
            .bind(ids)
            .fetch_one(executor)
            .await
    }

    /// Labels attached to a task, sorted by name
    pub async fn list_for_task(executor: impl PgExecutor<'_>, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            r#"
            SELECT l.*
            FROM labels l
            JOIN task_labels tl ON tl.label_id = l.id
            WHERE tl.task_id = $1
            ORDER BY l.name, l.id
            "#,
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }
}

/// Operations on the `task_labels` join table
pub struct TaskLabel;

impl TaskLabel {
    /// Links every label in `label_ids` to the task, ignoring existing links
    pub async fn attach(
        executor: impl PgExecutor<'_>,
        task_id: Uuid,
        label_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        if label_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO task_labels (task_id, label_id)
            SELECT $1, label_id FROM UNNEST($2::uuid[]) AS label_id
            ON CONFLICT (task_id, label_id) DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(label_ids)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn clear_for_task(executor: impl PgExecutor<'_>, task_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_labels WHERE task_id = $1")
            .bind(task_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn clear_for_label(executor: impl PgExecutor<'_>, label_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_labels WHERE label_id = $1")
            .bind(label_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
