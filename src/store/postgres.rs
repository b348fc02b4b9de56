//! sqlx/Postgres store. Queries are runtime-checked so the crate builds
//! without a live database; the schema is bootstrapped with idempotent DDL
//! at connect time.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::portal::{PortalConfig, PortalFields};
use crate::store::{NodeStore, PortalConfigStore, StorageError};
use crate::tree::{Category, Node};

pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct NodeRow {
    id: Uuid,
    name: String,
    category: String,
    parent_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<NodeRow> for Node {
    type Error = StorageError;

    fn try_from(row: NodeRow) -> Result<Self, Self::Error> {
        let category = Category::from_str(&row.category)
            .map_err(|e| StorageError::Query(format!("node {}: {}", row.id, e)))?;
        Ok(Node {
            id: row.id,
            name: row.name,
            category,
            parent_id: row.parent_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ConfigRow {
    id: Uuid,
    node_id: Uuid,
    fields: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ConfigRow> for PortalConfig {
    type Error = StorageError;

    fn try_from(row: ConfigRow) -> Result<Self, Self::Error> {
        let fields: PortalFields = serde_json::from_value(row.fields)
            .map_err(|e| StorageError::Query(format!("config {}: {}", row.id, e)))?;
        Ok(PortalConfig {
            id: row.id,
            node_id: row.node_id,
            fields,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgStore {
    /// Connect and ensure the two tables exist.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.init_schema().await?;
        info!("connected to postgres node store");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                parent_id UUID REFERENCES nodes(id),
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS portal_configs (
                id UUID PRIMARY KEY,
                node_id UUID NOT NULL REFERENCES nodes(id),
                fields JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl NodeStore for PgStore {
    async fn insert(&self, node: Node) -> Result<Node, StorageError> {
        sqlx::query(
            "INSERT INTO nodes (id, name, category, parent_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(node.id)
        .bind(&node.name)
        .bind(node.category.as_str())
        .bind(node.parent_id)
        .bind(node.created_at)
        .bind(node.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(node)
    }

    async fn update(
        &self,
        id: Uuid,
        name: String,
        category: Category,
        parent_id: Option<Uuid>,
    ) -> Result<Node, StorageError> {
        let row: Option<NodeRow> = sqlx::query_as(
            "UPDATE nodes SET name = $2, category = $3, parent_id = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, category, parent_id, created_at, updated_at",
        )
        .bind(id)
        .bind(&name)
        .bind(category.as_str())
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StorageError::NotFound(format!("node {}", id)))?
            .try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("node {}", id)));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Node>, StorageError> {
        let row: Option<NodeRow> = sqlx::query_as(
            "SELECT id, name, category, parent_id, created_at, updated_at \
             FROM nodes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Node::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Node>, StorageError> {
        let rows: Vec<NodeRow> = sqlx::query_as(
            "SELECT id, name, category, parent_id, created_at, updated_at \
             FROM nodes ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Node::try_from).collect()
    }

    async fn list_children(&self, id: Uuid) -> Result<Vec<Node>, StorageError> {
        let rows: Vec<NodeRow> = sqlx::query_as(
            "SELECT id, name, category, parent_id, created_at, updated_at \
             FROM nodes WHERE parent_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Node::try_from).collect()
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl PortalConfigStore for PgStore {
    async fn insert(&self, config: PortalConfig) -> Result<PortalConfig, StorageError> {
        let fields = serde_json::to_value(&config.fields)
            .map_err(|e| StorageError::Query(e.to_string()))?;
        sqlx::query(
            "INSERT INTO portal_configs (id, node_id, fields, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(config.id)
        .bind(config.node_id)
        .bind(fields)
        .bind(config.created_at)
        .bind(config.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(config)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        fields: PortalFields,
    ) -> Result<PortalConfig, StorageError> {
        let value = serde_json::to_value(&fields)
            .map_err(|e| StorageError::Query(e.to_string()))?;
        let row: Option<ConfigRow> = sqlx::query_as(
            "UPDATE portal_configs SET fields = $2, updated_at = now() WHERE id = $1 \
             RETURNING id, node_id, fields, created_at, updated_at",
        )
        .bind(id)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StorageError::NotFound(format!("config {}", id)))?
            .try_into()
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM portal_configs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("config {}", id)));
        }
        Ok(())
    }

    async fn delete_by_node(&self, node_id: Uuid) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM portal_configs WHERE node_id = $1")
            .bind(node_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PortalConfig>, StorageError> {
        let row: Option<ConfigRow> = sqlx::query_as(
            "SELECT id, node_id, fields, created_at, updated_at \
             FROM portal_configs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(PortalConfig::try_from).transpose()
    }

    async fn find_by_node(&self, node_id: Uuid) -> Result<Option<PortalConfig>, StorageError> {
        let row: Option<ConfigRow> = sqlx::query_as(
            "SELECT id, node_id, fields, created_at, updated_at \
             FROM portal_configs WHERE node_id = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(node_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(PortalConfig::try_from).transpose()
    }

    async fn list_for_nodes(&self, node_ids: &[Uuid]) -> Result<Vec<PortalConfig>, StorageError> {
        if node_ids.is_empty() {
            return Ok(vec![]);
        }
        let rows: Vec<ConfigRow> = sqlx::query_as(
            "SELECT id, node_id, fields, created_at, updated_at \
             FROM portal_configs WHERE node_id = ANY($1)",
        )
        .bind(node_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(PortalConfig::try_from).collect()
    }
}
