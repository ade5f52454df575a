/// Integration tests for the service layer
///
/// These tests require a running PostgreSQL database and are skipped when
/// `DATABASE_URL` is not set. Each test works with freshly generated
/// accounts, so they can run in parallel against one database.

use chrono::Duration;
use sqlx::PgPool;
use std::env;
use taskdeck_shared::auth::jwt::SessionSigner;
use taskdeck_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
use taskdeck_shared::models::{
    label::Label,
    project::{NewProject, Project},
    task::{Task, TaskFilter, TaskStatus},
    user::User,
};
use taskdeck_shared::notify::{Email, Notifier};
use taskdeck_shared::services::{
    AuthService, CreateTask, LabelService, ProjectService, ServiceError, SubtaskChanges, TaskChanges,
    TaskService,
};
use tokio::sync::mpsc;
use uuid::Uuid;

const PASSWORD: &str = "Abcd123!";

struct Harness {
    pool: PgPool,
    auth: AuthService,
    projects: ProjectService,
    tasks: TaskService,
    labels: LabelService,
    outbox: mpsc::Receiver<Email>,
}

async fn harness() -> Option<Harness> {
    let Ok(url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };

    let pool = create_pool(DatabaseConfig::new(url)).await.expect("Failed to create pool");
    run_migrations(&pool).await.expect("Migrations failed");

    let (notifier, outbox) = Notifier::channel(16);
    let signer = SessionSigner::new("test-secret-key-at-least-32-bytes-long", Duration::hours(1));

    Some(Harness {
        auth: AuthService::new(pool.clone(), signer, notifier, "no-reply@taskdeck.test"),
        projects: ProjectService::new(pool.clone()),
        tasks: TaskService::new(pool.clone()),
        labels: LabelService::new(pool.clone()),
        pool,
        outbox,
    })
}

fn unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4())
}

impl Harness {
    async fn verification_code(&self, email: &str) -> String {
        User::find_by_email(&self.pool, email)
            .await
            .unwrap()
            .unwrap()
            .email_verification_token
            .expect("verification code should be set")
    }

    async fn latest_reset_code(&self, user_id: Uuid) -> String {
        sqlx::query_scalar(
            "SELECT token FROM password_reset_tokens WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    /// Signs up and verifies a fresh account, returning its id
    async fn verified_user(&self) -> (Uuid, String) {
        let email = unique_email();
        let user = self.auth.signup(&email, PASSWORD, None).await.unwrap();
        let code = self.verification_code(&email).await;
        self.auth.activate(&email, &code).await.unwrap();
        (user.id, email)
    }
}

#[tokio::test]
async fn test_signup_queues_verification_email() {
    let Some(mut h) = harness().await else { return };
    let email = unique_email();

    let user = h.auth.signup(&email.to_uppercase(), PASSWORD, Some("Ann".into())).await.unwrap();
    assert_eq!(user.email, email);
    assert!(!user.email_verified);

    let sent = h.outbox.try_recv().expect("verification email should be queued");
    assert_eq!(sent.to, email);
    assert_eq!(sent.subject, "Verify Your Email");

    let code = h.verification_code(&email).await;
    assert!(sent.html.contains(&code));
}

#[tokio::test]
async fn test_signup_twice_is_rejected() {
    let Some(h) = harness().await else { return };
    let email = unique_email();

    h.auth.signup(&email, PASSWORD, None).await.unwrap();
    let err = h.auth.signup(&email, PASSWORD, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::EmailTaken));
}

#[tokio::test]
async fn test_activation_cannot_be_replayed() {
    let Some(h) = harness().await else { return };
    let email = unique_email();

    h.auth.signup(&email, PASSWORD, None).await.unwrap();
    let code = h.verification_code(&email).await;

    assert!(matches!(
        h.auth.activate(&email, "zzzzz").await.unwrap_err(),
        ServiceError::InvalidToken
    ));

    let user = h.auth.activate(&email, &code).await.unwrap();
    assert!(user.email_verified);

    assert!(matches!(
        h.auth.activate(&email, &code).await.unwrap_err(),
        ServiceError::InvalidToken
    ));
}

#[tokio::test]
async fn test_login_rules() {
    let Some(h) = harness().await else { return };
    let email = unique_email();

    h.auth.signup(&email, PASSWORD, None).await.unwrap();

    assert!(matches!(
        h.auth.login(&email, PASSWORD).await.unwrap_err(),
        ServiceError::UnverifiedAccount
    ));

    let code = h.verification_code(&email).await;
    h.auth.activate(&email, &code).await.unwrap();

    assert!(matches!(
        h.auth.login(&email, "Wrong123!").await.unwrap_err(),
        ServiceError::InvalidCredentials
    ));
    assert!(matches!(
        h.auth.login(&unique_email(), PASSWORD).await.unwrap_err(),
        ServiceError::InvalidCredentials
    ));

    let outcome = h.auth.login(&email, PASSWORD).await.unwrap();
    assert!(outcome.user.last_login_at.is_some());

    let claims = h.auth.signer().verify(&outcome.token).unwrap();
    assert_eq!(claims.sub, outcome.user.id);
}

#[tokio::test]
async fn test_resend_activation_does_not_leak_accounts() {
    let Some(mut h) = harness().await else { return };

    h.auth.resend_activation(&unique_email()).await.unwrap();
    assert!(h.outbox.try_recv().is_err());

    let email = unique_email();
    h.auth.signup(&email, PASSWORD, None).await.unwrap();
    let first = h.verification_code(&email).await;
    h.outbox.try_recv().unwrap();

    h.auth.resend_activation(&email).await.unwrap();
    assert!(h.outbox.try_recv().is_ok());

    let second = h.verification_code(&email).await;
    h.auth.activate(&email, &second).await.unwrap();
    if first != second {
        assert!(h.auth.activate(&email, &first).await.is_err());
    }
}

#[tokio::test]
async fn test_password_reset_code_is_single_use() {
    let Some(h) = harness().await else { return };
    let (user_id, email) = h.verified_user().await;

    h.auth.request_password_reset(&email).await.unwrap();
    let code = h.latest_reset_code(user_id).await;

    h.auth.validate_password_reset(&email, &code).await.unwrap();
    assert!(matches!(
        h.auth.validate_password_reset(&unique_email(), &code).await.unwrap_err(),
        ServiceError::InvalidOrExpiredToken
    ));

    h.auth.complete_password_reset(&email, &code, "Newpass1!").await.unwrap();

    assert!(matches!(
        h.auth.complete_password_reset(&email, &code, "Other12!").await.unwrap_err(),
        ServiceError::InvalidOrExpiredToken
    ));

    assert!(h.auth.login(&email, PASSWORD).await.is_err());
    assert!(h.auth.login(&email, "Newpass1!").await.is_ok());
}

#[tokio::test]
async fn test_reset_request_for_unknown_email_succeeds_silently() {
    let Some(mut h) = harness().await else { return };

    h.auth.request_password_reset(&unique_email()).await.unwrap();
    assert!(h.outbox.try_recv().is_err());
}

#[tokio::test]
async fn test_projects_are_private() {
    let Some(h) = harness().await else { return };
    let (alice, _) = h.verified_user().await;
    let (bob, _) = h.verified_user().await;

    let project = h
        .projects
        .create(alice, NewProject { name: "Home".into(), description: None, color: None })
        .await
        .unwrap();
    assert_eq!(project.color, taskdeck_shared::models::project::DEFAULT_PROJECT_COLOR);

    assert!(matches!(
        h.projects.get(bob, project.id).await.unwrap_err(),
        ServiceError::NotFound("Project")
    ));
    assert!(h.projects.delete(bob, project.id).await.is_err());
    assert!(h.projects.list(bob).await.unwrap().is_empty());

    assert!(Project::find_by_id(&h.pool, project.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_task_with_foreign_project_is_not_created() {
    let Some(h) = harness().await else { return };
    let (alice, _) = h.verified_user().await;
    let (bob, _) = h.verified_user().await;

    let bobs_project = h
        .projects
        .create(bob, NewProject { name: "Bob's".into(), description: None, color: None })
        .await
        .unwrap();

    let err = h
        .tasks
        .create(
            alice,
            CreateTask {
                title: "Sneaky".into(),
                project_id: Some(bobs_project.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidReference(_)));

    let bobs_label = h.labels.create(bob, "urgent", None).await.unwrap();
    let err = h
        .tasks
        .create(
            alice,
            CreateTask {
                title: "Sneaky".into(),
                label_ids: vec![bobs_label.id],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidReference(_)));

    let tasks = Task::list_for_user(&h.pool, alice, &TaskFilter::default()).await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn test_project_delete_detaches_tasks() {
    let Some(h) = harness().await else { return };
    let (user, _) = h.verified_user().await;

    let project = h
        .projects
        .create(user, NewProject { name: "Work".into(), description: None, color: None })
        .await
        .unwrap();
    let task = h
        .tasks
        .create(
            user,
            CreateTask {
                title: "Report".into(),
                project_id: Some(project.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(h.projects.delete(user, project.id).await.unwrap(), 1);

    let task = h.tasks.get(user, task.task.id).await.unwrap();
    assert_eq!(task.task.project_id, None);
}

#[tokio::test]
async fn test_task_lifecycle() {
    let Some(h) = harness().await else { return };
    let (user, _) = h.verified_user().await;

    let home = h.labels.create(user, "home", Some("#22c55e")).await.unwrap();
    let urgent = h.labels.create(user, "urgent", None).await.unwrap();

    let created = h
        .tasks
        .create(
            user,
            CreateTask {
                title: "Clean".into(),
                label_ids: vec![home.id, home.id],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.task.status, TaskStatus::Todo);
    assert_eq!(created.labels.len(), 1);

    let updated = h
        .tasks
        .update(
            user,
            created.task.id,
            TaskChanges {
                status: Some(TaskStatus::Done),
                label_ids: Some(vec![urgent.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.task.completed_at.is_some());
    assert_eq!(updated.labels.iter().map(|l| l.id).collect::<Vec<_>>(), vec![urgent.id]);

    assert!(matches!(
        h.tasks.update(user, created.task.id, TaskChanges::default()).await.unwrap_err(),
        ServiceError::NoChanges
    ));

    let subtask = h.tasks.add_subtask(user, created.task.id, "Kitchen").await.unwrap();
    let subtask = h
        .tasks
        .update_subtask(
            user,
            created.task.id,
            subtask.id,
            SubtaskChanges { title: None, is_completed: Some(true) },
        )
        .await
        .unwrap();
    assert!(subtask.is_completed);
    assert!(subtask.completed_at.is_some());

    let done = h
        .tasks
        .list(user, &TaskFilter { status: Some(TaskStatus::Done), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(done.len(), 1);

    h.labels.delete(user, urgent.id).await.unwrap();
    assert!(h.tasks.get(user, created.task.id).await.unwrap().labels.is_empty());

    h.tasks.delete(user, created.task.id).await.unwrap();
    assert!(matches!(
        h.tasks.get(user, created.task.id).await.unwrap_err(),
        ServiceError::NotFound("Task")
    ));
    assert!(Label::find_by_id(&h.pool, home.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_expired_verification_code_is_rejected() {
    let Some(h) = harness().await else { return };
    let email = unique_email();

    h.auth.signup(&email, PASSWORD, None).await.unwrap();
    let code = h.verification_code(&email).await;

    sqlx::query(
        "UPDATE users SET email_verification_token_expires = NOW() - INTERVAL '1 hour' WHERE email = $1",
    )
    .bind(&email)
    .execute(&h.pool)
    .await
    .unwrap();

    assert!(matches!(
        h.auth.activate(&email, &code).await.unwrap_err(),
        ServiceError::TokenExpired
    ));

    let user = User::find_by_email(&h.pool, &email).await.unwrap().unwrap();
    assert!(!user.email_verified);
}

#[tokio::test]
async fn test_expired_reset_code_is_rejected() {
    let Some(h) = harness().await else { return };
    let (user_id, email) = h.verified_user().await;

    h.auth.request_password_reset(&email).await.unwrap();
    let code = h.latest_reset_code(user_id).await;

    sqlx::query("UPDATE password_reset_tokens SET expires_at = NOW() - INTERVAL '1 minute' WHERE user_id = $1")
        .bind(user_id)
        .execute(&h.pool)
        .await
        .unwrap();

    assert!(matches!(
        h.auth.validate_password_reset(&email, &code).await.unwrap_err(),
        ServiceError::InvalidOrExpiredToken
    ));
    assert!(matches!(
        h.auth.complete_password_reset(&email, &code, "Newpass1!").await.unwrap_err(),
        ServiceError::InvalidOrExpiredToken
    ));

    assert!(h.auth.login(&email, PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_task_cannot_move_into_foreign_project() {
    let Some(h) = harness().await else { return };
    let (alice, _) = h.verified_user().await;
    let (bob, _) = h.verified_user().await;

    let alices_project = h
        .projects
        .create(alice, NewProject { name: "Home".into(), description: None, color: None })
        .await
        .unwrap();
    let bobs_project = h
        .projects
        .create(bob, NewProject { name: "Bob's".into(), description: None, color: None })
        .await
        .unwrap();
    let task = h
        .tasks
        .create(
            alice,
            CreateTask {
                title: "Laundry".into(),
                project_id: Some(alices_project.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = h
        .tasks
        .update(
            alice,
            task.task.id,
            TaskChanges {
                title: Some("Moved".into()),
                project_id: Some(Some(bobs_project.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidReference(_)));

    let unchanged = h.tasks.get(alice, task.task.id).await.unwrap();
    assert_eq!(unchanged.task.project_id, Some(alices_project.id));
    assert_eq!(unchanged.task.title, "Laundry");
}

#[tokio::test]
async fn test_task_delete_removes_subtasks_and_label_links() {
    let Some(h) = harness().await else { return };
    let (user, _) = h.verified_user().await;

    let label = h.labels.create(user, "errands", None).await.unwrap();
    let task = h
        .tasks
        .create(
            user,
            CreateTask {
                title: "Shopping".into(),
                label_ids: vec![label.id],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    h.tasks.add_subtask(user, task.task.id, "Milk").await.unwrap();
    h.tasks.add_subtask(user, task.task.id, "Bread").await.unwrap();

    h.tasks.delete(user, task.task.id).await.unwrap();

    let subtasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subtasks WHERE task_id = $1")
        .bind(task.task.id)
        .fetch_one(&h.pool)
        .await
        .unwrap();
    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task_labels WHERE task_id = $1")
        .bind(task.task.id)
        .fetch_one(&h.pool)
        .await
        .unwrap();
    assert_eq!(subtasks, 0);
    assert_eq!(links, 0);
    assert!(Label::find_by_id(&h.pool, label.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_overlong_color_is_rejected_before_insert() {
    let Some(h) = harness().await else { return };
    let (user, _) = h.verified_user().await;
    let color = format!("rgb({})", "10, ".repeat(20));

    let err = h
        .projects
        .create(user, NewProject { name: "Home".into(), description: None, color: Some(color.clone()) })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidColor));
    assert!(h.projects.list(user).await.unwrap().is_empty());

    let err = h.labels.create(user, "home", Some(&color)).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidColor));
    assert!(h.labels.list(user).await.unwrap().is_empty());
}
