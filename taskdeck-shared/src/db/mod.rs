/// Persistence gateway
///
/// TaskDeck stores everything in PostgreSQL through sqlx.
///
/// # Modules
///
/// - `pool`: Connection pool creation, health check, shutdown
/// - `migrations`: Embedded schema migrations from `migrations/`
/// - Models live in the `models` module at crate root level. Their queries
///   accept any [`sqlx::postgres::PgExecutor`], so the same call runs on the
///   pool or inside a transaction.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

pub mod migrations;
pub mod pool;

/// Name of the unique index on `users.email`
pub const USERS_EMAIL_UNIQUE: &str = "users_email_idx";

/// Name of the unique index on `password_reset_tokens.token`
pub const RESET_TOKEN_UNIQUE: &str = "password_reset_tokens_token_idx";

/// Returns true when `err` is a unique violation on the named constraint
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
