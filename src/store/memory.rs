//! HashMap-backed store used by the test suite and by deployments that run
//! without a database (state is lost on restart).

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::portal::{PortalConfig, PortalFields};
use crate::store::{NodeStore, PortalConfigStore, StorageError};
use crate::tree::{Category, Node};

#[derive(Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<Uuid, Node>>,
    configs: RwLock<HashMap<Uuid, PortalConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_nodes(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, Node>> {
        self.nodes.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_nodes(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Node>> {
        self.nodes.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_configs(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, PortalConfig>> {
        self.configs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_configs(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, PortalConfig>> {
        self.configs.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn insert(&self, node: Node) -> Result<Node, StorageError> {
        self.write_nodes().insert(node.id, node.clone());
        Ok(node)
    }

    async fn update(
        &self,
        id: Uuid,
        name: String,
        category: Category,
        parent_id: Option<Uuid>,
    ) -> Result<Node, StorageError> {
        let mut nodes = self.write_nodes();
        let node = nodes
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("node {}", id)))?;
        node.name = name;
        node.category = category;
        node.parent_id = parent_id;
        node.updated_at = Utc::now();
        Ok(node.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        self.write_nodes()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("node {}", id)))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Node>, StorageError> {
        Ok(self.read_nodes().get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Node>, StorageError> {
        let mut nodes: Vec<Node> = self.read_nodes().values().cloned().collect();
        nodes.sort_by_key(|n| n.created_at);
        Ok(nodes)
    }

    async fn list_children(&self, id: Uuid) -> Result<Vec<Node>, StorageError> {
        let mut children: Vec<Node> = self
            .read_nodes()
            .values()
            .filter(|n| n.parent_id == Some(id))
            .cloned()
            .collect();
        children.sort_by_key(|n| n.created_at);
        Ok(children)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[async_trait]
impl PortalConfigStore for MemoryStore {
    async fn insert(&self, config: PortalConfig) -> Result<PortalConfig, StorageError> {
        self.write_configs().insert(config.id, config.clone());
        Ok(config)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        fields: PortalFields,
    ) -> Result<PortalConfig, StorageError> {
        let mut configs = self.write_configs();
        let config = configs
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("config {}", id)))?;
        config.fields = fields;
        config.updated_at = Utc::now();
        Ok(config.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        self.write_configs()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(format!("config {}", id)))
    }

    async fn delete_by_node(&self, node_id: Uuid) -> Result<(), StorageError> {
        self.write_configs().retain(|_, c| c.node_id != node_id);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PortalConfig>, StorageError> {
        Ok(self.read_configs().get(&id).cloned())
    }

    async fn find_by_node(&self, node_id: Uuid) -> Result<Option<PortalConfig>, StorageError> {
        Ok(self
            .read_configs()
            .values()
            .find(|c| c.node_id == node_id)
            .cloned())
    }

    async fn list_for_nodes(&self, node_ids: &[Uuid]) -> Result<Vec<PortalConfig>, StorageError> {
        Ok(self
            .read_configs()
            .values()
            .filter(|c| node_ids.contains(&c.node_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn node_crud_round_trip() {
        let store = MemoryStore::new();
        let root = Node::new("Root", Category::Root, None);
        let root_id = root.id;
        NodeStore::insert(&store, root).await.unwrap();

        let child = Node::new("Acme", Category::Kunde, Some(root_id));
        let child_id = child.id;
        NodeStore::insert(&store, child).await.unwrap();

        assert_eq!(store.list_all().await.unwrap().len(), 2);
        assert_eq!(store.list_children(root_id).await.unwrap().len(), 1);

        let updated = store
            .update(child_id, "Acme GmbH".into(), Category::Kunde, Some(root_id))
            .await
            .unwrap();
        assert_eq!(updated.name, "Acme GmbH");

        assert!(store.ping().await.is_ok());

        NodeStore::delete(&store, child_id).await.unwrap();
        assert!(NodeStore::get(&store, child_id).await.unwrap().is_none());
        assert!(matches!(
            NodeStore::delete(&store, child_id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn config_lookup_by_node() {
        let store = MemoryStore::new();
        let node_id = Uuid::new_v4();
        let config = PortalConfig::new(node_id, PortalFields::default());
        let config_id = config.id;
        PortalConfigStore::insert(&store, config).await.unwrap();

        assert!(store.find_by_node(node_id).await.unwrap().is_some());
        assert_eq!(
            store.list_for_nodes(&[node_id]).await.unwrap().len(),
            1
        );

        store.delete_by_node(node_id).await.unwrap();
        assert!(PortalConfigStore::get(&store, config_id).await.unwrap().is_none());
    }
}
