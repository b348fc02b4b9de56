pub mod enforcer;
pub mod error;
pub mod node;
pub mod snapshot;

pub use error::TreeError;
pub use node::{Category, Node};
pub use snapshot::TreeSnapshot;
