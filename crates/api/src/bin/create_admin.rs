// Bootstrap an administrator account
// Usage: create-admin <email> <password>

use anyhow::Context;
use dotenvy::dotenv;
use sso_api::{config::Config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(email), Some(password)) = (args.next(), args.next()) else {
        eprintln!("Usage: create-admin <email> <password>");
        std::process::exit(2);
    };

    let config = Config::from_env()?;
    let database = sso_database::Database::new(config.database.clone())
        .await
        .context("Failed to connect to database")?;

    let state = AppState::new(&database, config);
    let admin = state
        .users
        .create_admin(&email, &password)
        .await
        .with_context(|| format!("Failed to create admin {}", email))?;

    tracing::info!("✅ Admin created: id={}, email={}", admin.id, admin.email);
    println!("{}", admin.id);

    database.close().await;
    Ok(())
}
