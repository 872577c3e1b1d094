//! Shelfwise CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run reader site database migrations
//! sw-cli migrate web
//!
//! # Run admin database migrations
//! sw-cli migrate admin
//!
//! # Run all database migrations
//! sw-cli migrate all
//!
//! # Create admin user
//! sw-cli admin create -e admin@example.com -n "Admin Name" -r super_admin -p '...'
//!
//! # Load catalog books from YAML
//! sw-cli seed books -f books.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sw-cli")]
#[command(author, version, about = "Shelfwise CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run reader site (`library` schema) migrations
    Web,
    /// Run admin (`admin` schema) migrations
    Admin,
    /// Run all database migrations
    All,
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

        /// Admin role (`super_admin`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Initial password (at least 12 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Add catalog books from a YAML file
    Books {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate { target } => match target {
            MigrateTarget::Web => commands::migrate::web().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::web().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::admin::create_user(&email, &name, &role, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Books { file } => {
                commands::seed::books(&file).await?;
            }
        },
    }
    Ok(())
}
