//! Admin user management commands.
//!
//! Passwords go through the same validation and hashing as the web login.

use lakeside_site::db::{AdminRepository, RepositoryError};
use lakeside_site::services::auth::{AuthError, AuthService, generate_password};
use thiserror::Error;

use super::{ConnectError, connect};

const GENERATED_PASSWORD_LENGTH: usize = 16;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

/// Use the given password or generate one, printing it when generated.
#[allow(clippy::print_stdout)]
fn password_or_generated(password: Option<String>) -> String {
    password.unwrap_or_else(|| {
        let generated = generate_password(GENERATED_PASSWORD_LENGTH);
        println!("Generated password: {generated}");
        println!("Store it now; it is not shown again.");
        generated
    })
}

/// Create a new admin user.
#[allow(clippy::print_stdout)]
pub async fn create_user(username: &str, password: Option<String>) -> Result<(), AdminError> {
    let pool = connect().await?;
    let auth = AuthService::new(AdminRepository::new(&pool));

    let password = password_or_generated(password);
    let user = auth.create_admin(username, &password).await?;

    tracing::info!(admin_id = %user.id, "Admin user created");
    println!("Created admin {} (ID: {})", user.username, user.id);
    Ok(())
}

/// Replace an admin's password. Existing sessions of that admin are revoked.
#[allow(clippy::print_stdout)]
pub async fn reset_password(
    username: &str,
    password: Option<String>,
    create: bool,
) -> Result<(), AdminError> {
    let pool = connect().await?;
    let auth = AuthService::new(AdminRepository::new(&pool));

    let password = password_or_generated(password);
    let user = auth.reset_password(username, &password, create).await?;

    println!("Password updated for {} (ID: {})", user.username, user.id);
    Ok(())
}

/// Print every admin user.
#[allow(clippy::print_stdout)]
pub async fn list_users() -> Result<(), AdminError> {
    let pool = connect().await?;
    let users = AdminRepository::new(&pool).list_users().await?;

    if users.is_empty() {
        println!("No admin users");
        return Ok(());
    }
    for user in users {
        println!(
            "{:>4}  {:<32}  {}",
            user.id,
            user.username,
            user.created_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    Ok(())
}
