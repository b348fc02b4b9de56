//! Captive-portal config routes.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::portal::{PortalConfig, PortalFields};
use crate::scope::Actor;

#[derive(Debug, Deserialize)]
pub struct NodeQuery {
    pub node_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpsertRequest {
    pub node_id: Uuid,
    #[serde(flatten)]
    pub fields: PortalFields,
}

/// GET /api/captive-portal?node_id=X - configs on the ancestor chain of X,
/// root-to-node; the last entry is the effective one
pub async fn list_on_path(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<NodeQuery>,
) -> ApiResult<Vec<PortalConfig>> {
    let configs = state
        .portal_service()
        .configs_on_path(&actor, query.node_id)
        .await?;
    Ok(ApiResponse::success(configs))
}

/// GET /api/captive-portal/effective?node_id=X - the resolved config, or
/// null when nothing on the chain is configured
pub async fn effective(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<NodeQuery>,
) -> ApiResult<Option<PortalConfig>> {
    let config = state
        .portal_service()
        .effective_config(&actor, query.node_id)
        .await?;
    Ok(ApiResponse::success(config))
}

/// POST /api/captive-portal - assign a config to a node (upsert)
pub async fn upsert(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<UpsertRequest>,
) -> ApiResult<PortalConfig> {
    let (config, created) = state
        .portal_service()
        .upsert(&actor, req.node_id, req.fields)
        .await?;
    if created {
        Ok(ApiResponse::created(config))
    } else {
        Ok(ApiResponse::success(config))
    }
}

/// PUT /api/captive-portal/:id - replace the fields of an existing config
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(fields): Json<PortalFields>,
) -> ApiResult<PortalConfig> {
    let config = state.portal_service().update(&actor, id, fields).await?;
    Ok(ApiResponse::success(config))
}

/// DELETE /api/captive-portal/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.portal_service().delete(&actor, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
