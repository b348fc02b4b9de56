pub mod config;
pub mod engine;
pub mod error;

pub use config::{PortalConfig, PortalFields};
pub use error::PortalError;
