use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hierarchy level of a node. The tree is customers -> sites -> areas with a
/// single synthetic root above the customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Root,
    Kunde,
    Standort,
    Bereich,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Root => "ROOT",
            Category::Kunde => "KUNDE",
            Category::Standort => "STANDORT",
            Category::Bereich => "BEREICH",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROOT" => Ok(Category::Root),
            "KUNDE" => Ok(Category::Kunde),
            "STANDORT" => Ok(Category::Standort),
            "BEREICH" => Ok(Category::Bereich),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// A node in the tenant hierarchy, stored as a parent-pointer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    pub fn new(name: impl Into<String>, category: Category, parent_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_round_trips_through_str() {
        for c in [Category::Root, Category::Kunde, Category::Standort, Category::Bereich] {
            assert_eq!(Category::from_str(c.as_str()), Ok(c));
        }
        assert!(Category::from_str("AREA").is_err());
    }

    #[test]
    fn category_serializes_screaming_snake() {
        let json = serde_json::to_string(&Category::Standort).unwrap();
        assert_eq!(json, "\"STANDORT\"");
    }
}
