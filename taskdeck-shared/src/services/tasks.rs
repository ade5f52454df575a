/// Task service: tasks, their label links, and subtasks
///
/// Multi-statement writes (task plus label links, label replacement, task
/// deletion) run in one transaction each. A task that references a project
/// or label the caller does not own is rejected before anything is written.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::{require_owner, Owned};
use crate::models::label::{Label, TaskLabel};
use crate::models::project::Project;
use crate::models::subtask::Subtask;
use crate::models::task::{NewTask, Task, TaskFilter, TaskPriority, TaskStatus};

use super::error::ServiceError;
use super::validation::dedup_ids;

/// Input for [`TaskService::create`]
#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
    pub label_ids: Vec<Uuid>,
}

/// Partial update; `None` leaves a field unchanged, `Some(None)` clears a
/// nullable field
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub project_id: Option<Option<Uuid>>,
    /// Replaces the whole label set
    pub label_ids: Option<Vec<Uuid>>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.project_id.is_none()
            && self.label_ids.is_none()
    }

    /// Applies the scalar changes to `task`
    fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.apply_status(status, now);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubtaskChanges {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

/// A task with its subtasks and labels
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Subtask>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone)]
pub struct TaskService {
    pool: PgPool,
}

impl TaskService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a task and links its labels in one transaction
    ///
    /// # Errors
    ///
    /// `InvalidReference` when `project_id` or any of `label_ids` is missing
    /// or owned by another user; no row is written in that case.
    pub async fn create(&self, user_id: Uuid, data: CreateTask) -> Result<TaskDetail, ServiceError> {
        let label_ids = dedup_ids(&data.label_ids);
        let mut tx = self.pool.begin().await?;

        if let Some(project_id) = data.project_id {
            ensure_project_owned(&mut tx, user_id, project_id).await?;
        }
        ensure_labels_owned(&mut tx, user_id, &label_ids).await?;

        let task = Task::create(
            &mut *tx,
            user_id,
            NewTask {
                title: data.title,
                description: data.description,
                status: data.status.unwrap_or_default(),
                priority: data.priority.unwrap_or_default(),
                due_date: data.due_date,
                project_id: data.project_id,
            },
        )
        .await?;

        TaskLabel::attach(&mut *tx, task.id, &label_ids).await?;
        let labels = Label::list_for_task(&mut *tx, task.id).await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            task_id = %task.id,
            status = task.status.as_str(),
            priority = task.priority.as_str(),
            labels = labels.len(),
            "Task created"
        );

        Ok(TaskDetail {
            task,
            subtasks: Vec::new(),
            labels,
        })
    }

    pub async fn list(&self, user_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, ServiceError> {
        Ok(Task::list_for_user(&self.pool, user_id, filter).await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<TaskDetail, ServiceError> {
        let task = self.owned_task(user_id, id).await?;
        let subtasks = Subtask::list_for_task(&self.pool, id).await?;
        let labels = Label::list_for_task(&self.pool, id).await?;

        Ok(TaskDetail { task, subtasks, labels })
    }

    /// Applies `changes` to the task
    ///
    /// # Errors
    ///
    /// - `NoChanges` when no field was supplied
    /// - `NotFound` when the task is missing or not the caller's
    /// - `InvalidReference` for a foreign or unknown project or label
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: TaskChanges,
    ) -> Result<TaskDetail, ServiceError> {
        if changes.is_empty() {
            return Err(ServiceError::NoChanges);
        }

        let mut tx = self.pool.begin().await?;

        let mut task = require_owner(Task::find_by_id(&mut *tx, id).await?, user_id, "Task")?;

        if let Some(Some(project_id)) = changes.project_id {
            ensure_project_owned(&mut tx, user_id, project_id).await?;
        }

        let label_ids = changes.label_ids.as_deref().map(dedup_ids);
        if let Some(label_ids) = &label_ids {
            ensure_labels_owned(&mut tx, user_id, label_ids).await?;
        }

        changes.apply(&mut task, Utc::now());
        let task = Task::update(&mut *tx, &task).await?;

        if let Some(label_ids) = &label_ids {
            TaskLabel::clear_for_task(&mut *tx, id).await?;
            TaskLabel::attach(&mut *tx, id, label_ids).await?;
        }

        let subtasks = Subtask::list_for_task(&mut *tx, id).await?;
        let labels = Label::list_for_task(&mut *tx, id).await?;

        tx.commit().await?;

        info!(user_id = %user_id, task_id = %id, status = task.status.as_str(), "Task updated");
        Ok(TaskDetail { task, subtasks, labels })
    }

    /// Deletes the task with its label links and subtasks
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        require_owner(Task::find_by_id(&mut *tx, id).await?, user_id, "Task")?;

        TaskLabel::clear_for_task(&mut *tx, id).await?;
        Subtask::delete_for_task(&mut *tx, id).await?;
        Task::delete(&mut *tx, id).await?;

        tx.commit().await?;

        info!(user_id = %user_id, task_id = %id, "Task deleted");
        Ok(())
    }

    pub async fn add_subtask(&self, user_id: Uuid, task_id: Uuid, title: &str) -> Result<Subtask, ServiceError> {
        self.owned_task(user_id, task_id).await?;
        let subtask = Subtask::create(&self.pool, task_id, title).await?;

        info!(user_id = %user_id, task_id = %task_id, subtask_id = %subtask.id, "Subtask created");
        Ok(subtask)
    }

    pub async fn update_subtask(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        subtask_id: Uuid,
        changes: SubtaskChanges,
    ) -> Result<Subtask, ServiceError> {
        if changes.title.is_none() && changes.is_completed.is_none() {
            return Err(ServiceError::NoChanges);
        }

        self.owned_task(user_id, task_id).await?;
        let mut subtask = Subtask::find_in_task(&self.pool, task_id, subtask_id)
            .await?
            .ok_or(ServiceError::NotFound("Subtask"))?;

        if let Some(title) = changes.title {
            subtask.title = title;
        }
        if let Some(done) = changes.is_completed {
            subtask.set_completed(done, Utc::now());
        }

        Ok(Subtask::update(&self.pool, &subtask).await?)
    }

    pub async fn delete_subtask(&self, user_id: Uuid, task_id: Uuid, subtask_id: Uuid) -> Result<(), ServiceError> {
        self.owned_task(user_id, task_id).await?;
        Subtask::find_in_task(&self.pool, task_id, subtask_id)
            .await?
            .ok_or(ServiceError::NotFound("Subtask"))?;

        Subtask::delete(&self.pool, subtask_id).await?;
        Ok(())
    }

    async fn owned_task(&self, user_id: Uuid, id: Uuid) -> Result<Task, ServiceError> {
        let task = Task::find_by_id(&self.pool, id).await?;
        Ok(require_owner(task, user_id, "Task")?)
    }
}

async fn ensure_project_owned(
    conn: &mut PgConnection,
    user_id: Uuid,
    project_id: Uuid,
) -> Result<(), ServiceError> {
    match Project::find_by_id(&mut *conn, project_id).await? {
        Some(project) if project.is_owned_by(user_id) => Ok(()),
        _ => Err(ServiceError::InvalidReference("Project not found".to_string())),
    }
}

/// `label_ids` must already be deduplicated
async fn ensure_labels_owned(
    conn: &mut PgConnection,
    user_id: Uuid,
    label_ids: &[Uuid],
) -> Result<(), ServiceError> {
    if label_ids.is_empty() {
        return Ok(());
    }

    let owned = Label::count_owned(&mut *conn, user_id, label_ids).await?;
    if owned as usize != label_ids.len() {
        return Err(ServiceError::InvalidReference("Label not found".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: "Write report".to_string(),
            description: Some("Q3".to_string()),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: Some(now),
            project_id: Some(Uuid::new_v4()),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn test_is_empty() {
        assert!(TaskChanges::default().is_empty());
        assert!(!TaskChanges {
            label_ids: Some(vec![]),
            ..Default::default()
        }
        .is_empty());
        assert!(!TaskChanges {
            project_id: Some(None),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_apply_clears_nullable_fields() {
        let mut t = task();
        TaskChanges {
            description: Some(None),
            due_date: Some(None),
            project_id: Some(None),
            ..Default::default()
        }
        .apply(&mut t, Utc::now());

        assert_eq!(t.description, None);
        assert_eq!(t.due_date, None);
        assert_eq!(t.project_id, None);
        assert_eq!(t.title, "Write report");
    }

    #[test]
    fn test_apply_status_done_stamps_completion() {
        let mut t = task();
        let now = Utc::now();
        TaskChanges {
            status: Some(TaskStatus::Done),
            priority: Some(TaskPriority::High),
            ..Default::default()
        }
        .apply(&mut t, now);

        assert_eq!(t.status, TaskStatus::Done);
        assert_eq!(t.priority, TaskPriority::High);
        assert_eq!(t.completed_at, Some(now));
    }

    #[test]
    fn test_task_detail_flattens_task() {
        let detail = TaskDetail {
            task: task(),
            subtasks: vec![],
            labels: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["title"], "Write report");
        assert!(json["subtasks"].as_array().unwrap().is_empty());
        assert!(json.get("task").is_none());
    }
}
