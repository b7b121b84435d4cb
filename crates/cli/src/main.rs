//! Qaima CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! qaima migrate
//!
//! # Write default data into an empty store
//! qaima seed
//!
//! # Add whichever default records are missing
//! qaima seed --fill-missing
//!
//! # Remove duplicate categories (keeps the newest of each name)
//! qaima cleanup --dry-run
//! qaima cleanup
//!
//! # Print what the store holds
//! qaima verify
//!
//! # Create admin user
//! qaima admin create -e admin@example.com -n "Admin Name" -p "s3cret-pass"
//! ```
//!
//! All commands read `QAIMA_DATABASE_URL` (falling back to `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "qaima")]
#[command(author, version, about = "Qaima CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Write default menu data
    Seed {
        /// Add missing default records instead of requiring an empty store
        #[arg(long)]
        fill_missing: bool,
    },
    /// Remove duplicate categories and their items
    Cleanup {
        /// Report what would be removed without deleting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print settings, categories and sample items
    Verify,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password (hashed with Argon2 before storing)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { fill_missing } => commands::seed::run(fill_missing).await?,
        Commands::Cleanup { dry_run } => commands::cleanup::run(dry_run).await?,
        Commands::Verify => commands::verify::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
        },
    }
    Ok(())
}
