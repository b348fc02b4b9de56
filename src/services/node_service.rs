//! Node orchestration: scope check first, then invariant validation against
//! a fresh snapshot, then the store write. Nothing is written when any
//! check fails.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::scope::{self, Actor, Role};
use crate::store::{NodeStore, PortalConfigStore};
use crate::tree::{enforcer, Category, Node, TreeSnapshot};

#[derive(Debug, Deserialize)]
pub struct CreateNodeRequest {
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub category: Category,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNodeRequest {
    pub name: String,
    pub category: Category,
    /// When set to a different parent this is a reparent and runs the move
    /// validation. Omitted means "keep the current parent".
    pub parent_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct NodeService {
    nodes: Arc<dyn NodeStore>,
    configs: Arc<dyn PortalConfigStore>,
}

impl NodeService {
    pub fn new(nodes: Arc<dyn NodeStore>, configs: Arc<dyn PortalConfigStore>) -> Self {
        Self { nodes, configs }
    }

    /// One batch fetch per request; all validation and traversal runs
    /// against this consistent view.
    pub async fn snapshot(&self) -> Result<TreeSnapshot, ApiError> {
        let nodes = self.nodes.list_all().await?;
        Ok(TreeSnapshot::from_nodes(nodes))
    }

    /// Create the implicit root when the store is empty, e.g. at first
    /// startup. Returns the root either way.
    pub async fn ensure_root(&self) -> Result<Node, ApiError> {
        let snapshot = self.snapshot().await?;
        if let Some(root) = snapshot.root() {
            return Ok(root.clone());
        }
        let root = Node::new("Root", Category::Root, None);
        let root = self.nodes.insert(root).await?;
        info!(root_id = %root.id, "created implicit root node");
        Ok(root)
    }

    pub async fn list_visible(&self, actor: &Actor) -> Result<Vec<Node>, ApiError> {
        let snapshot = self.snapshot().await?;
        Ok(scope::visible_nodes(actor, &snapshot))
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Node, ApiError> {
        let snapshot = self.snapshot().await?;
        let node = snapshot
            .get(id)
            .ok_or_else(|| ApiError::not_found(format!("node not found: {}", id)))?;
        if !scope::can_access_node(actor, &snapshot, id) {
            return Err(ApiError::forbidden("node is outside your scope"));
        }
        Ok(node.clone())
    }

    pub async fn create(&self, actor: &Actor, req: CreateNodeRequest) -> Result<Node, ApiError> {
        let snapshot = self.snapshot().await?;

        match req.parent_id {
            // Only a SUPERADMIN may touch the top of the tree.
            None => {
                if actor.role != Role::Superadmin {
                    return Err(ApiError::forbidden("only a superadmin may create a root node"));
                }
            }
            Some(parent_id) => {
                if actor.role == Role::User {
                    return Err(ApiError::forbidden("users may not modify the node tree"));
                }
                if !scope::can_access_node(actor, &snapshot, parent_id) {
                    return Err(ApiError::forbidden("parent node is outside your scope"));
                }
            }
        }

        enforcer::validate_create(&snapshot, req.parent_id, req.category)?;

        let node = Node::new(req.name, req.category, req.parent_id);
        let node = self.nodes.insert(node).await?;
        info!(node_id = %node.id, category = %node.category, "node created");
        Ok(node)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        req: UpdateNodeRequest,
    ) -> Result<Node, ApiError> {
        let snapshot = self.snapshot().await?;
        let current = snapshot
            .get(id)
            .ok_or_else(|| ApiError::not_found(format!("node not found: {}", id)))?;

        if actor.role == Role::User {
            return Err(ApiError::forbidden("users may not modify the node tree"));
        }
        if !scope::can_access_node(actor, &snapshot, id) {
            return Err(ApiError::forbidden("node is outside your scope"));
        }

        let move_target = match req.parent_id {
            Some(new_parent) if Some(new_parent) != current.parent_id => Some(new_parent),
            _ => None,
        };

        enforcer::validate_update(&snapshot, id, req.category, move_target)?;

        let new_parent_id = match move_target {
            Some(new_parent) => {
                if !scope::can_access_node(actor, &snapshot, new_parent) {
                    return Err(ApiError::forbidden("target parent is outside your scope"));
                }
                enforcer::validate_move(&snapshot, id, new_parent, req.category)?;
                Some(new_parent)
            }
            None => current.parent_id,
        };

        let node = self
            .nodes
            .update(id, req.name, req.category, new_parent_id)
            .await?;
        info!(node_id = %node.id, "node updated");
        Ok(node)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ApiError> {
        let snapshot = self.snapshot().await?;

        if actor.role == Role::User {
            return Err(ApiError::forbidden("users may not modify the node tree"));
        }
        if !snapshot.contains(id) {
            return Err(ApiError::not_found(format!("node not found: {}", id)));
        }
        if !scope::can_access_node(actor, &snapshot, id) {
            return Err(ApiError::forbidden("node is outside your scope"));
        }

        enforcer::validate_delete(&snapshot, id)?;

        // Attached portal config goes with the node (cascade).
        self.configs.delete_by_node(id).await?;
        self.nodes.delete(id).await?;
        info!(node_id = %id, "node deleted");
        Ok(())
    }
}
