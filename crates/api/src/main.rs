// SSO API Server
// Main entry point for the identity REST API

use anyhow::Context;
use dotenvy::dotenv;
use sso_api::config::Config;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,sso_api=debug,tower_http=debug".to_string()),
        )
        .init();

    tracing::info!("🚀 Starting SSO API Server");
    tracing::info!("📦 Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    tracing::info!("🔌 Server: {}:{}", config.server_host, config.server_port);

    tracing::info!("🗄️  Connecting to database...");
    let database = sso_database::Database::new(config.database.clone())
        .await
        .context("Failed to connect to database")?;
    database.ping().await.context("Database ping failed")?;
    tracing::info!("✅ Database connected");

    let addr = format!("{}:{}", config.server_host, config.server_port);

    let app = sso_api::app(&database, config)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("✅ Server ready at http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
