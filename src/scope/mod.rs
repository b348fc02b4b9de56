//! Role and home-node based visibility. An ADMIN is pinned to a home node
//! and sees exactly that subtree; a SUPERADMIN sees everything; a USER sees
//! nothing of the administration tree.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tree::{Node, TreeSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Superadmin,
    Admin,
    User,
}

/// The acting identity of a request, supplied by the auth middleware.
/// Never persisted by the core.
#[derive(Debug, Clone)]
pub struct Actor {
    pub role: Role,
    pub home_node_id: Option<Uuid>,
}

impl Actor {
    pub fn superadmin() -> Self {
        Self {
            role: Role::Superadmin,
            home_node_id: None,
        }
    }

    pub fn admin(home_node_id: Uuid) -> Self {
        Self {
            role: Role::Admin,
            home_node_id: Some(home_node_id),
        }
    }

    pub fn user() -> Self {
        Self {
            role: Role::User,
            home_node_id: None,
        }
    }
}

/// The set of nodes the actor may see, as flat clones ordered by creation
/// time. A SUPERADMIN gets the full stored node set rather than a root
/// traversal, so orphaned rows of a damaged tree stay visible and
/// repairable.
pub fn visible_nodes(actor: &Actor, snapshot: &TreeSnapshot) -> Vec<Node> {
    match actor.role {
        Role::Superadmin => {
            let mut all: Vec<Node> = snapshot.nodes().cloned().collect();
            all.sort_by_key(|n| n.created_at);
            all
        }
        Role::Admin => match actor.home_node_id.and_then(|id| snapshot.get(id)) {
            Some(home) => {
                let mut nodes = vec![home.clone()];
                nodes.extend(snapshot.descendants(home.id).into_iter().cloned());
                nodes
            }
            // An admin without a home node (or with a stale one) sees
            // nothing rather than everything.
            None => vec![],
        },
        Role::User => vec![],
    }
}

/// Whether the actor may see or act on the given node. Fails closed: an
/// unknown node is not accessible to anyone below SUPERADMIN.
pub fn can_access_node(actor: &Actor, snapshot: &TreeSnapshot, node_id: Uuid) -> bool {
    match actor.role {
        Role::Superadmin => true,
        Role::Admin => match actor.home_node_id {
            Some(home) => node_id == home || snapshot.is_descendant_of(node_id, home),
            None => false,
        },
        Role::User => false,
    }
}

/// Guard for config reads and mutations; a config is as visible as the
/// node it is attached to.
pub fn can_access_config(actor: &Actor, snapshot: &TreeSnapshot, config_node_id: Uuid) -> bool {
    can_access_node(actor, snapshot, config_node_id)
}
