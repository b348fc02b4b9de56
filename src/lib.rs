pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod portal;
pub mod scope;
pub mod services;
pub mod store;
pub mod tree;
