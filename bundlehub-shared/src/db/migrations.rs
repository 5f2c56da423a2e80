/// Database migration runner
///
/// Runs the SQL migrations shipped in this crate's `migrations/` directory
/// using sqlx's embedded migration system.
///
/// # Example
///
/// ```no_run
/// use bundlehub_shared::db::pool::{create_pool, DatabaseConfig};
/// use bundlehub_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Migrations are embedded at compile time from `migrations/`. Already-applied
/// migrations are skipped; a failing migration is rolled back and returned as
/// an error.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
