use std::sync::Arc;

use anyhow::Context;
use blog_api::{config::Config, db::PgPostStore, routes::create_router, utils::init_logger, AppState};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    // Connect to database
    let pool = blog_api::db::create_pool(&config.database).await?;
    info!("Database connection established");

    // Create shared state
    let state = AppState {
        store: Arc::new(PgPostStore::new(pool)),
        config: config.clone(),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
