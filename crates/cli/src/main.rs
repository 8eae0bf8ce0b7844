//! Pit Tracker CLI - Database migrations and admin seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create the account, loan and session tables
//! pt-cli migrate
//!
//! # Create the bootstrap admin (no-op if the email is already taken)
//! pt-cli admin seed -e lead@team1234.org -u lead -p 'correct horse'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin seed` - Idempotently create an admin account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pt-cli")]
#[command(author, version, about = "Pit Tracker CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (application tables and session store)
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin account unless one with this email exists
    Seed {
        /// Admin email address
        #[arg(short, long, env = "PIT_TRACKER_SEED_ADMIN_EMAIL")]
        email: String,

        /// Admin username
        #[arg(short, long, env = "PIT_TRACKER_SEED_ADMIN_USERNAME")]
        username: String,

        /// Admin password
        #[arg(
            short,
            long,
            env = "PIT_TRACKER_SEED_ADMIN_PASSWORD",
            hide_env_values = true
        )]
        password: String,
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
        Commands::Admin { action } => match action {
            AdminAction::Seed {
                email,
                username,
                password,
            } => {
                commands::admin::seed(&email, &username, password.into()).await?;
            }
        },
    }
    Ok(())
}
