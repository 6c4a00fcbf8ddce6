//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Persistence backends
//! - Plugins: Catalog and loader for configured units
//! - Adapters: Protocol integrations (console)

pub mod config;
pub mod storage;
pub mod plugins;
pub mod adapters;
