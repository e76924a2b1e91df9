//! Mona CLI - database migrations and diagnostics.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations to DATABASE_URL
//! mona-cli migrate
//!
//! # Insert a demo merchant with products, customers, and orders
//! mona-cli seed --user-id demo-merchant
//!
//! # Print the business snapshot the assistant would see
//! mona-cli snapshot demo-merchant
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mona-cli")]
#[command(author, version, about = "Mona engine CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed a demo merchant
    Seed {
        /// Tenant to create the demo data under
        #[arg(short, long, default_value = commands::seed::DEMO_TENANT)]
        user_id: String,
    },
    /// Print a merchant's business snapshot
    Snapshot {
        /// Tenant whose snapshot to build
        user_id: String,
    },
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
        Commands::Seed { user_id } => commands::seed::demo_merchant(&user_id).await?,
        Commands::Snapshot { user_id } => commands::snapshot::print(&user_id).await?,
    }
    Ok(())
}
