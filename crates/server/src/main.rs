use anyhow::{Context, Result};
use burnboard_server::{create_router, AppConfig, AppState};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.database_auth_token.is_some() {
        tracing::warn!("DATABASE_AUTH_TOKEN is set but a local SQLite database does not use it");
    }
    tracing::info!(admins = config.admin_emails.len(), "configuration loaded");

    let db = burnboard_storage::create_db(&config.database_url)
        .await
        .context("failed to open database")?;

    let bind_address = config.bind_address;
    let app = create_router(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!(address = %bind_address, "burnboard server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing() {
    let formatting_layer = BunyanFormattingLayer::new(env!("CARGO_PKG_NAME").into(), std::io::stdout);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(JsonStorageLayer)
        .with(formatting_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
