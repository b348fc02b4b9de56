use std::sync::Arc;

use portal_admin_api::app::{app, AppState};
use portal_admin_api::config;
use portal_admin_api::store::postgres::PgStore;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    info!("starting portal-admin-api in {:?} mode", config.environment);

    let state = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = Arc::new(PgStore::connect(&url, config.database.max_connections).await?);
            AppState::new(store.clone(), store)
        }
        Err(_) => {
            warn!("DATABASE_URL not set, using in-memory store (state is lost on restart)");
            AppState::in_memory()
        }
    };

    // The tree always has its single root.
    let root = state.node_service().ensure_root().await.map_err(|e| {
        anyhow::anyhow!("failed to bootstrap root node: {}", e.message())
    })?;
    info!(root_id = %root.id, "node tree ready");

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("portal-admin-api listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
