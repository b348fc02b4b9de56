pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::portal::{PortalConfig, PortalFields};
use crate::tree::{Category, Node};

/// Errors from the persistence backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence contract for hierarchy nodes. Implementations do not
/// serialize concurrent writers; callers validate against a snapshot and
/// accept the usual read-then-write race window (see DESIGN.md).
#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn insert(&self, node: Node) -> Result<Node, StorageError>;

    /// Persist new name/category/parent for an existing node.
    async fn update(
        &self,
        id: Uuid,
        name: String,
        category: Category,
        parent_id: Option<Uuid>,
    ) -> Result<Node, StorageError>;

    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;

    async fn get(&self, id: Uuid) -> Result<Option<Node>, StorageError>;

    async fn list_all(&self) -> Result<Vec<Node>, StorageError>;

    async fn list_children(&self, id: Uuid) -> Result<Vec<Node>, StorageError>;

    /// Backend reachability check for the health endpoint.
    async fn ping(&self) -> Result<(), StorageError>;
}

/// Persistence contract for captive-portal configs.
#[async_trait]
pub trait PortalConfigStore: Send + Sync {
    async fn insert(&self, config: PortalConfig) -> Result<PortalConfig, StorageError>;

    async fn update_fields(
        &self,
        id: Uuid,
        fields: PortalFields,
    ) -> Result<PortalConfig, StorageError>;

    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;

    async fn delete_by_node(&self, node_id: Uuid) -> Result<(), StorageError>;

    async fn get(&self, id: Uuid) -> Result<Option<PortalConfig>, StorageError>;

    async fn find_by_node(&self, node_id: Uuid) -> Result<Option<PortalConfig>, StorageError>;

    /// All configs attached to any of the given nodes, unordered. The
    /// resolution engine sorts by path position.
    async fn list_for_nodes(&self, node_ids: &[Uuid]) -> Result<Vec<PortalConfig>, StorageError>;
}
