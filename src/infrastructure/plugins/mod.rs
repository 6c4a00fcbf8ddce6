//! Unit loading for computer-bot
//! 
//! Persistence backends and bot modules are named in the configuration by
//! `source` and `type`. The catalog maps those names to constructors compiled
//! into the binary; the loader resolves and builds them at startup.

pub mod loader;
pub mod manifest;
pub mod registry;

pub use loader::{load_module, load_persistence};
pub use manifest::UnitDescriptor;
pub use registry::{Catalog, ModuleFactory, PersistenceFactory};
