//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresPlanCatalog` - Plans on sale
//! - `PostgresMembershipStore` - Current membership per user (reader + repository)
//! - `PostgresTransactionStore` - Upgrade checkout records
//!
//! Schema lives in the crate's `migrations/` directory.

mod membership_store;
mod plan_catalog;
mod transaction_store;

pub use membership_store::PostgresMembershipStore;
pub use plan_catalog::PostgresPlanCatalog;
pub use transaction_store::PostgresTransactionStore;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// Open a connection pool and, when configured, run pending migrations.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
