//! Unit catalog - maps configured (source, type) names to constructors

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::{BotError, LoadError, StorageError};
use crate::domain::traits::{Logger, Persistence};
use crate::infrastructure::storage::{JsonStore, MemoryStore, SqliteStore};
use crate::modules::{Heartbeat, Module, ModuleContext, Notes};

/// Builds a persistence backend from (config, logger)
pub type PersistenceFactory = fn(&serde_yaml::Value, Logger) -> Result<Arc<dyn Persistence>, StorageError>;

/// Builds a bot module from its context
pub type ModuleFactory = fn(ModuleContext) -> Result<Box<dyn Module>, BotError>;

fn open_persistence<P: Persistence + 'static>(
    config: &serde_yaml::Value,
    logger: Logger,
) -> Result<Arc<dyn Persistence>, StorageError> {
    Ok(Arc::new(P::open(config, logger)?))
}

fn construct_module<M: Module + 'static>(ctx: ModuleContext) -> Result<Box<dyn Module>, BotError> {
    Ok(Box::new(M::new(ctx)?))
}

/// source -> type -> factory
struct FactoryTable<F> {
    unit: &'static str,
    sources: HashMap<String, HashMap<String, F>>,
}

impl<F: Copy> FactoryTable<F> {
    fn new(unit: &'static str) -> Self {
        Self {
            unit,
            sources: HashMap::new(),
        }
    }

    fn insert(&mut self, source: &str, type_name: &str, factory: F) {
        self.sources
            .entry(source.to_string())
            .or_default()
            .insert(type_name.to_string(), factory);
    }

    fn resolve(&self, source: &str, type_name: &str) -> Result<F, LoadError> {
        let types = self.sources.get(source).ok_or_else(|| LoadError::SourceNotFound {
            unit: self.unit,
            path: source.to_string(),
        })?;
        types.get(type_name).copied().ok_or_else(|| LoadError::TypeNotResolvable {
            unit: self.unit,
            path: source.to_string(),
            type_name: type_name.to_string(),
        })
    }

    fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .sources
            .iter()
            .flat_map(|(source, types)| types.keys().map(move |t| (source.clone(), t.clone())))
            .collect();
        entries.sort();
        entries
    }
}

/// Everything the host can load by name from configuration.
///
/// Populated once at start; `builtin()` carries the backends and modules
/// shipped with the crate, embedders add their own with `with_module`.
pub struct Catalog {
    persistence: FactoryTable<PersistenceFactory>,
    modules: FactoryTable<ModuleFactory>,
}

impl Catalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self {
            persistence: FactoryTable::new("persistence"),
            modules: FactoryTable::new("module"),
        }
    }

    pub fn builtin() -> Self {
        Self::new()
            .with_persistence::<MemoryStore>("persistence/memory", "MemoryStore")
            .with_persistence::<JsonStore>("persistence/json", "JsonStore")
            .with_persistence::<SqliteStore>("persistence/sqlite", "SqliteStore")
            .with_module::<Notes>("modules/notes", "Notes")
            .with_module::<Heartbeat>("modules/heartbeat", "Heartbeat")
    }

    pub fn with_persistence<P: Persistence + 'static>(mut self, source: &str, type_name: &str) -> Self {
        self.register_persistence::<P>(source, type_name);
        self
    }

    pub fn with_module<M: Module + 'static>(mut self, source: &str, type_name: &str) -> Self {
        self.register_module::<M>(source, type_name);
        self
    }

    pub fn register_persistence<P: Persistence + 'static>(&mut self, source: &str, type_name: &str) {
        self.persistence.insert(source, type_name, open_persistence::<P>);
    }

    pub fn register_module<M: Module + 'static>(&mut self, source: &str, type_name: &str) {
        self.modules.insert(source, type_name, construct_module::<M>);
    }

    pub fn resolve_persistence(&self, source: &str, type_name: &str) -> Result<PersistenceFactory, LoadError> {
        self.persistence.resolve(source, type_name)
    }

    pub fn resolve_module(&self, source: &str, type_name: &str) -> Result<ModuleFactory, LoadError> {
        self.modules.resolve(source, type_name)
    }

    /// Sorted (source, type) pairs of every loadable module
    pub fn module_entries(&self) -> Vec<(String, String)> {
        self.modules.entries()
    }

    /// Sorted (source, type) pairs of every persistence backend
    pub fn persistence_entries(&self) -> Vec<(String, String)> {
        self.persistence.entries()
    }
}
