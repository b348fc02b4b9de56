pub mod nodes;
pub mod portal;
