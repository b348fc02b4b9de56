//! Node tree routes. The actor arrives as a request extension from the JWT
//! middleware; everything else is delegated to `NodeService`.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::scope::Actor;
use crate::services::{CreateNodeRequest, UpdateNodeRequest};
use crate::tree::Node;

/// GET /api/nodes - flat list of all nodes visible to the actor
pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<Node>> {
    let nodes = state.node_service().list_visible(&actor).await?;
    Ok(ApiResponse::success(nodes))
}

/// GET /api/nodes/:id - single node, scope-checked
pub async fn get(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<Node> {
    let node = state.node_service().get(&actor, id).await?;
    Ok(ApiResponse::success(node))
}

/// POST /api/nodes - create a node under a parent
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateNodeRequest>,
) -> ApiResult<Node> {
    let node = state.node_service().create(&actor, req).await?;
    Ok(ApiResponse::created(node))
}

/// PUT /api/nodes/:id - rename, recategorize or reparent a node
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNodeRequest>,
) -> ApiResult<Node> {
    let node = state.node_service().update(&actor, id, req).await?;
    Ok(ApiResponse::success(node))
}

/// DELETE /api/nodes/:id - leaf-only delete, cascades the attached config
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.node_service().delete(&actor, id).await?;
    Ok(ApiResponse::<()>::no_content())
}
