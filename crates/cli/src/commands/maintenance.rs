//! Ledger maintenance commands.
//!
//! Both commands are idempotent and safe to run while the services are up;
//! they take row locks only on the rows they touch.

use secrecy::SecretString;

use atelier_shop::db::{InventoryRepository, ProductRepository, RepositoryError};

/// Error type for maintenance commands.
#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

async fn connect() -> Result<sqlx::PgPool, MaintenanceError> {
    dotenvy::dotenv().ok();

    let database_url: SecretString = std::env::var("DATABASE_URL")
        .map_err(|_| MaintenanceError::MissingEnvVar("DATABASE_URL"))?
        .into();

    Ok(atelier_shop::db::create_pool(&database_url).await?)
}

/// Regenerate SKUs for ledger rows with a blank SKU or one that collides
/// with an older row.
pub async fn repair_skus() -> Result<(), MaintenanceError> {
    let pool = connect().await?;

    tracing::info!("Scanning inventory ledger for broken SKUs...");
    let repaired = InventoryRepository::new(&pool).repair_skus().await?;

    tracing::info!("Repaired {repaired} SKUs");
    Ok(())
}

/// Recompute every product's materialized stock total from its ledger rows.
pub async fn recount_stock() -> Result<(), MaintenanceError> {
    let pool = connect().await?;

    tracing::info!("Recounting product stock from the ledger...");
    let updated = ProductRepository::new(&pool).recount_all_stock().await?;

    tracing::info!("Updated stock on {updated} products");
    Ok(())
}
