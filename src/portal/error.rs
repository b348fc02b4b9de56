use thiserror::Error;
use uuid::Uuid;

use crate::store::StorageError;
use crate::tree::TreeError;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("config not found: {0}")]
    ConfigNotFound(Uuid),

    #[error("node not found: {0}")]
    NodeNotFound(Uuid),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
