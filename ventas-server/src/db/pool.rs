//! Database connection pool management
//!
//! Pools through the sqlx `Any` driver so the same code runs against the
//! managed Postgres deployment and the zero-config SQLite fallback.

use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;

use ventas_core::DbSettings;

/// Default maximum connections for the pool.
/// Kept low; each request holds a connection only for its one or two
/// statements.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create a connection pool for the given database URL.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn create_pool(database_url: &str) -> Result<AnyPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a connection pool with custom options.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<AnyPool, sqlx::Error> {
    // Registers the Postgres and SQLite drivers with the Any layer;
    // safe to call repeatedly.
    install_default_drivers();

    AnyPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Pool from resolved settings, logging which source won.
pub async fn connect(settings: &DbSettings) -> Result<AnyPool, sqlx::Error> {
    tracing::info!(source = ?settings.source, "connecting to database");
    create_pool(&settings.database_url).await
}
