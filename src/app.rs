//! Application state and router assembly. Store handles are injected here
//! so the same router runs against Postgres in production and the in-memory
//! store in tests.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::middleware::jwt_auth_middleware;
use crate::services::{NodeService, PortalService};
use crate::store::{memory::MemoryStore, NodeStore, PortalConfigStore, StorageError};

#[derive(Clone)]
pub struct AppState {
    nodes: Arc<dyn NodeStore>,
    configs: Arc<dyn PortalConfigStore>,
}

impl AppState {
    pub fn new(nodes: Arc<dyn NodeStore>, configs: Arc<dyn PortalConfigStore>) -> Self {
        Self { nodes, configs }
    }

    /// Both stores backed by one in-memory instance.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            nodes: store.clone(),
            configs: store,
        }
    }

    pub fn node_service(&self) -> NodeService {
        NodeService::new(self.nodes.clone(), self.configs.clone())
    }

    pub fn portal_service(&self) -> PortalService {
        PortalService::new(self.nodes.clone(), self.configs.clone())
    }

    /// Store reachability check backing the health endpoint.
    pub async fn ping(&self) -> Result<(), StorageError> {
        self.nodes.ping().await
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    use axum::routing::{delete, post, put};

    use crate::handlers::{nodes, portal};

    Router::new()
        // Node tree
        .route("/api/nodes", get(nodes::list).post(nodes::create))
        .route(
            "/api/nodes/:id",
            get(nodes::get).put(nodes::update).delete(nodes::delete),
        )
        // Captive portal configs
        .route(
            "/api/captive-portal",
            get(portal::list_on_path).post(portal::upsert),
        )
        .route("/api/captive-portal/effective", get(portal::effective))
        .route(
            "/api/captive-portal/:id",
            put(portal::update).delete(portal::delete),
        )
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Portal Admin API",
            "version": version,
            "description": "Tenant hierarchy administration with captive portal config inheritance",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "nodes": "/api/nodes[/:id] (protected)",
                "captive_portal": "/api/captive-portal[/:id], /api/captive-portal/effective (protected)",
            }
        }
    }))
}

/// Liveness plus a store ping, so a dead backend shows up as 503 instead
/// of a green check.
async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.ping().await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now()
        }
    })))
}
