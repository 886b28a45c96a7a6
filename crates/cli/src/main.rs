//! Atelier CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! atelier-cli migrate
//!
//! # Regenerate missing or duplicated SKUs in the inventory ledger
//! atelier-cli repair-skus
//!
//! # Recompute the materialized per-product stock totals
//! atelier-cli recount-stock
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `repair-skus` - Fix blank or duplicated ledger SKUs
//! - `recount-stock` - Resync product stock with the ledger

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "atelier-cli")]
#[command(author, version, about = "Atelier CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Regenerate missing or duplicated inventory SKUs
    RepairSkus,
    /// Recompute materialized product stock from the ledger
    RecountStock,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::RepairSkus => commands::maintenance::repair_skus().await?,
        Commands::RecountStock => commands::maintenance::recount_stock().await?,
    }
    Ok(())
}
