/// Label service
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::require_owner;
use crate::models::label::{Label, TaskLabel};

use super::error::ServiceError;
use super::validation::check_color;

#[derive(Debug, Clone, Default)]
pub struct LabelChanges {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LabelService {
    pool: PgPool,
}

impl LabelService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, name: &str, color: Option<&str>) -> Result<Label, ServiceError> {
        check_color(color)?;

        let label = Label::create(&self.pool, user_id, name, color).await?;
        info!(user_id = %user_id, label_id = %label.id, "Label created");
        Ok(label)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Label>, ServiceError> {
        Ok(Label::list_for_user(&self.pool, user_id).await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Label, ServiceError> {
        let label = Label::find_by_id(&self.pool, id).await?;
        Ok(require_owner(label, user_id, "Label")?)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, changes: LabelChanges) -> Result<Label, ServiceError> {
        if changes.name.is_none() && changes.color.is_none() {
            return Err(ServiceError::NoChanges);
        }
        check_color(changes.color.as_deref())?;

        let mut label = self.get(user_id, id).await?;
        if let Some(name) = changes.name {
            label.name = name;
        }
        if let Some(color) = changes.color {
            label.color = color;
        }

        Ok(Label::update(&self.pool, &label).await?)
    }

    /// Unlinks the label from every task and deletes it
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        require_owner(Label::find_by_id(&mut *tx, id).await?, user_id, "Label")?;
        let unlinked = TaskLabel::clear_for_label(&mut *tx, id).await?;
        Label::delete(&mut *tx, id).await?;

        tx.commit().await?;

        info!(user_id = %user_id, label_id = %id, unlinked, "Label deleted");
        Ok(())
    }
}
