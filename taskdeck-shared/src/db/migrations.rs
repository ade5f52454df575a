/// Schema migrations
///
/// The SQL files in `migrations/` at the workspace root are embedded at
/// compile time into [`MIGRATOR`]. sqlx records applied versions in its
/// `_sqlx_migrations` table.

use sqlx::migrate::{MigrateDatabase, MigrateError, Migrator};
use sqlx::{postgres::PgPool, Postgres};
use tracing::{debug, error, info};

pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied_migrations: usize,

    /// Highest applied version (the file's timestamp prefix)
    pub latest_version: Option<i64>,

    /// Embedded migrations not yet recorded as applied
    pub pending_migrations: usize,
}

/// Applies every pending migration, one transaction per file
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!(embedded = MIGRATOR.iter().count(), "Applying database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        error!(error = %e, "Database migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Compares the applied versions with the embedded set
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let tracked: Option<String> = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations')::text")
        .fetch_one(pool)
        .await?;

    let applied: Vec<i64> = if tracked.is_some() {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
            .fetch_all(pool)
            .await?
    } else {
        debug!("No migrations recorded yet");
        Vec::new()
    };

    let pending_migrations = MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration() && !applied.contains(&m.version))
        .count();

    Ok(MigrationStatus {
        applied_migrations: applied.len(),
        latest_version: applied.last().copied(),
        pending_migrations,
    })
}

/// Creates the target database when it is missing (development and tests)
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        return Ok(());
    }

    info!("Creating missing database");
    Postgres::create_database(database_url).await
}
