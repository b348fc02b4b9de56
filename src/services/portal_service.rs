//! Captive-portal config orchestration. Every operation resolves the scope
//! guard before touching configs, and the already-configured case of a
//! create is absorbed into an update (idempotent upsert).

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::portal::{engine, PortalConfig, PortalError, PortalFields};
use crate::scope::{self, Actor};
use crate::store::{NodeStore, PortalConfigStore};
use crate::tree::TreeSnapshot;

#[derive(Clone)]
pub struct PortalService {
    nodes: Arc<dyn NodeStore>,
    configs: Arc<dyn PortalConfigStore>,
}

impl PortalService {
    pub fn new(nodes: Arc<dyn NodeStore>, configs: Arc<dyn PortalConfigStore>) -> Self {
        Self { nodes, configs }
    }

    async fn snapshot(&self) -> Result<TreeSnapshot, ApiError> {
        let nodes = self.nodes.list_all().await?;
        Ok(TreeSnapshot::from_nodes(nodes))
    }

    fn guard(
        &self,
        actor: &Actor,
        snapshot: &TreeSnapshot,
        node_id: Uuid,
    ) -> Result<(), ApiError> {
        if !snapshot.contains(node_id) {
            return Err(PortalError::NodeNotFound(node_id).into());
        }
        if !scope::can_access_config(actor, snapshot, node_id) {
            return Err(ApiError::forbidden("config is outside your scope"));
        }
        Ok(())
    }

    /// All configs on the node's ancestor chain, root-to-node order. The
    /// last entry is the effective one.
    pub async fn configs_on_path(
        &self,
        actor: &Actor,
        node_id: Uuid,
    ) -> Result<Vec<PortalConfig>, ApiError> {
        let snapshot = self.snapshot().await?;
        self.guard(actor, &snapshot, node_id)?;

        let path_ids: Vec<Uuid> = snapshot.ancestors(node_id)?.iter().map(|n| n.id).collect();
        let configs = self.configs.list_for_nodes(&path_ids).await?;
        Ok(engine::configs_on_path(&snapshot, configs, node_id)?)
    }

    pub async fn effective_config(
        &self,
        actor: &Actor,
        node_id: Uuid,
    ) -> Result<Option<PortalConfig>, ApiError> {
        let snapshot = self.snapshot().await?;
        self.guard(actor, &snapshot, node_id)?;

        let path_ids: Vec<Uuid> = snapshot.ancestors(node_id)?.iter().map(|n| n.id).collect();
        let configs = self.configs.list_for_nodes(&path_ids).await?;
        Ok(engine::effective_config(&snapshot, configs, node_id)?)
    }

    /// Assign a config to a node. Returns the config and whether it was
    /// newly created (drives 201 vs 200).
    pub async fn upsert(
        &self,
        actor: &Actor,
        node_id: Uuid,
        fields: PortalFields,
    ) -> Result<(PortalConfig, bool), ApiError> {
        let snapshot = self.snapshot().await?;
        self.guard(actor, &snapshot, node_id)?;

        match self.configs.find_by_node(node_id).await? {
            Some(existing) => {
                let updated = self.configs.update_fields(existing.id, fields).await?;
                info!(config_id = %updated.id, node_id = %node_id, "portal config updated via upsert");
                Ok((updated, false))
            }
            None => {
                let config = PortalConfig::new(node_id, fields);
                let config = self.configs.insert(config).await?;
                info!(config_id = %config.id, node_id = %node_id, "portal config created");
                Ok((config, true))
            }
        }
    }

    pub async fn update(
        &self,
        actor: &Actor,
        config_id: Uuid,
        fields: PortalFields,
    ) -> Result<PortalConfig, ApiError> {
        let snapshot = self.snapshot().await?;
        let existing = self
            .configs
            .get(config_id)
            .await?
            .ok_or(PortalError::ConfigNotFound(config_id))?;
        self.guard(actor, &snapshot, existing.node_id)?;

        let updated = self.configs.update_fields(config_id, fields).await?;
        info!(config_id = %config_id, "portal config updated");
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, config_id: Uuid) -> Result<(), ApiError> {
        let snapshot = self.snapshot().await?;
        let existing = self
            .configs
            .get(config_id)
            .await?
            .ok_or(PortalError::ConfigNotFound(config_id))?;
        self.guard(actor, &snapshot, existing.node_id)?;

        self.configs.delete(config_id).await?;
        info!(config_id = %config_id, "portal config deleted");
        Ok(())
    }
}
