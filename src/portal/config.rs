use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display and session attributes of a captive-portal landing page. All
/// fields are optional; the portal runtime fills in system defaults for
/// anything unset on the effective config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_text: Option<String>,
}

/// A captive-portal configuration attached to exactly one node. Nodes
/// without their own config inherit the nearest configured ancestor's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub id: Uuid,
    pub node_id: Uuid,
    #[serde(flatten)]
    pub fields: PortalFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PortalConfig {
    pub fn new(node_id: Uuid, fields: PortalFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            node_id,
            fields,
            created_at: now,
            updated_at: now,
        }
    }
}
