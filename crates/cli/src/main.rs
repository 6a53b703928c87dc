//! Lakeside Farms CLI - database migrations and admin account management.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! lakeside-cli migrate
//!
//! # Create an admin (password generated and printed when omitted)
//! lakeside-cli admin create -u editor
//!
//! # Reset a password, signing out every session of that admin
//! lakeside-cli admin reset-password -u admin -p 'new-secret' --create
//!
//! # List admins
//! lakeside-cli admin list
//! ```
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_PASSWORD` - Default password for `admin create`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lakeside-cli")]
#[command(author, version, about = "Lakeside Farms CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
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
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password; generated when neither this nor `ADMIN_PASSWORD` is set
        #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Replace an admin's password and revoke their sessions
    ResetPassword {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// New password; generated when omitted
        #[arg(short, long)]
        password: Option<String>,

        /// Create the admin if the username does not exist
        #[arg(long)]
        create: bool,
    },
    /// List admin users
    List,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { username, password } => {
                commands::admin::create_user(&username, password).await?;
            }
            AdminAction::ResetPassword {
                username,
                password,
                create,
            } => {
                commands::admin::reset_password(&username, password, create).await?;
            }
            AdminAction::List => commands::admin::list_users().await?,
        },
    }
    Ok(())
}
