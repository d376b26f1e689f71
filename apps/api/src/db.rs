use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates a PostgreSQL connection pool.
///
/// Connections are opened lazily so the site keeps serving (and the mail stage
/// keeps working) while the database is unreachable; failures surface per request.
pub fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Configuring PostgreSQL pool...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect_lazy(database_url)?;

    info!("PostgreSQL pool configured");
    Ok(pool)
}
