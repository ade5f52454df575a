//! # TaskDeck API Server
//!
//! REST backend for personal task management: accounts with email
//! verification and password reset, plus per-user projects, tasks,
//! subtasks, and labels.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/taskdeck \
//! JWT_SECRET=change-me-to-something-at-least-32-chars \
//! cargo run -p taskdeck-api
//! ```

use std::sync::Arc;
use taskdeck_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use taskdeck_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    notify::{HttpMailer, LogMailer, Mailer, Notifier},
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        "TaskDeck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(DatabaseConfig {
        max_connections: config.database.max_connections,
        ..DatabaseConfig::new(config.database.url.clone())
    })
    .await?;

    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let mailer: Arc<dyn Mailer> = match &config.mail.relay_url {
        Some(url) => {
            tracing::info!(relay = %url, "Delivering email through HTTP relay");
            Arc::new(HttpMailer::new(url.clone(), config.mail.relay_api_key.clone())?)
        }
        None => {
            tracing::warn!("MAIL_RELAY_URL not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let shutdown = CancellationToken::new();
    let (notifier, dispatcher) = Notifier::spawn(mailer, config.mail.queue_capacity, shutdown.clone());

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config, notifier));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, draining mail queue...");
    shutdown.cancel();
    if let Err(e) = dispatcher.await {
        tracing::error!(error = %e, "Mail dispatcher panicked");
    }

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskdeck_api=debug,taskdeck_shared=debug,tower_http=debug".into());

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
