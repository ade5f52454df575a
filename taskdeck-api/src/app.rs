/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::{build_router, AppState}, config::Config};
/// use taskdeck_shared::notify::{LogMailer, Notifier};
/// use sqlx::PgPool;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let (notifier, _dispatcher) = Notifier::spawn(Arc::new(LogMailer), 256, CancellationToken::new());
///
/// let app = build_router(AppState::new(pool, config, notifier));
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::{
    auth::{jwt::SessionSigner, middleware::authenticate},
    notify::Notifier,
    services::{AuthService, LabelService, ProjectService, TaskService},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor; every field
/// is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub signer: SessionSigner,
    pub auth: AuthService,
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub labels: LabelService,
}

impl AppState {
    /// Wires the services from configuration
    pub fn new(db: PgPool, config: Config, notifier: Notifier) -> Self {
        let signer = SessionSigner::new(config.jwt.secret.clone(), config.session_ttl());
        let auth = AuthService::new(db.clone(), signer.clone(), notifier, config.mail.from.clone());

        Self {
            projects: ProjectService::new(db.clone()),
            tasks: TaskService::new(db.clone()),
            labels: LabelService::new(db.clone()),
            auth,
            signer,
            config: Arc::new(config),
            db,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// GET    /health
///
/// POST   /auth/signup
/// POST   /auth/activation
/// POST   /auth/activation/resend
/// POST   /auth/login
/// POST   /auth/password-reset/request
/// POST   /auth/password-reset/validate
/// POST   /auth/password-reset/complete
///
/// (bearer token required below)
/// GET    /project              POST   /project
/// GET    /project/:id          PUT    /project/:id      DELETE /project/:id
/// GET    /task                 POST   /task
/// GET    /task/:id             PUT|PATCH /task/:id      DELETE /task/:id
/// POST   /task/:id/subtasks
/// PATCH  /task/:id/subtasks/:subtask_id                 DELETE /task/:id/subtasks/:subtask_id
/// GET    /label                POST   /label
/// GET    /label/:id            PUT    /label/:id        DELETE /label/:id
/// ```
///
/// # Middleware Stack
///
/// 1. Session authentication (route layer on protected routes only, so
///    unknown paths still 404)
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/activation", post(routes::auth::activate))
        .route("/activation/resend", post(routes::auth::resend_activation))
        .route("/login", post(routes::auth::login))
        .route("/password-reset/request", post(routes::auth::request_password_reset))
        .route("/password-reset/validate", post(routes::auth::validate_password_reset))
        .route("/password-reset/complete", post(routes::auth::complete_password_reset));

    let protected_routes = Router::new()
        .route(
            "/project",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/project/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/task",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/task/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/task/:id/subtasks", post(routes::tasks::create_subtask))
        .route(
            "/task/:id/subtasks/:subtask_id",
            patch(routes::tasks::update_subtask).delete(routes::tasks::delete_subtask),
        )
        .route(
            "/label",
            get(routes::labels::list_labels).post(routes::labels::create_label),
        )
        .route(
            "/label/:id",
            get(routes::labels::get_label)
                .put(routes::labels::update_label)
                .delete(routes::labels::delete_label),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), session_auth_layer));

    let cors = if state.config.api.cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Resolves the bearer session token and stores the caller in the request
/// extensions for the `AuthContext` extractor
async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), &state.signer)?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
