use thiserror::Error;
use uuid::Uuid;

use crate::store::StorageError;
use crate::tree::Category;

/// Errors raised by tree validation and resolution.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("a node under a {parent} parent must have category BEREICH, got {requested}")]
    InvalidCategoryForParent { parent: Category, requested: Category },

    #[error("the root node's category cannot be changed")]
    RootCategoryImmutable,

    #[error("cannot change category to BEREICH while children have other categories")]
    IncompatibleChildCategories,

    #[error("a node cannot be its own parent")]
    SelfParent,

    #[error("moving the node under one of its descendants would create a cycle")]
    WouldCreateCycle,

    #[error("the root node cannot be moved")]
    CannotMoveRoot,

    #[error("a root node already exists")]
    RootAlreadyExists,

    #[error("node has children and cannot be deleted")]
    NodeHasChildren,

    #[error("parent node not found: {0}")]
    ParentNotFound(Uuid),

    #[error("node not found: {0}")]
    NodeNotFound(Uuid),

    #[error("tree structure is corrupt near node {0} (cycle or dangling parent)")]
    CorruptTree(Uuid),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TreeError {
    /// Stable machine-readable kind tag, independent of the display message.
    pub fn kind(&self) -> &'static str {
        match self {
            TreeError::InvalidCategoryForParent { .. } => "INVALID_CATEGORY_FOR_PARENT",
            TreeError::RootCategoryImmutable => "ROOT_CATEGORY_IMMUTABLE",
            TreeError::IncompatibleChildCategories => "INCOMPATIBLE_CHILD_CATEGORIES",
            TreeError::SelfParent => "SELF_PARENT",
            TreeError::WouldCreateCycle => "WOULD_CREATE_CYCLE",
            TreeError::CannotMoveRoot => "CANNOT_MOVE_ROOT",
            TreeError::RootAlreadyExists => "ROOT_ALREADY_EXISTS",
            TreeError::NodeHasChildren => "NODE_HAS_CHILDREN",
            TreeError::ParentNotFound(_) => "PARENT_NOT_FOUND",
            TreeError::NodeNotFound(_) => "NODE_NOT_FOUND",
            TreeError::CorruptTree(_) => "CORRUPT_TREE",
            TreeError::Storage(_) => "STORAGE_ERROR",
        }
    }
}
