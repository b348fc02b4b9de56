pub mod node_service;
pub mod portal_service;

pub use node_service::{CreateNodeRequest, NodeService, UpdateNodeRequest};
pub use portal_service::PortalService;
