//! Unit loader - builds the configured persistence backend and modules

use std::sync::Arc;

use super::manifest::UnitDescriptor;
use super::registry::Catalog;
use crate::application::errors::LoadError;
use crate::application::services::Bot;
use crate::domain::traits::Persistence;
use crate::modules::{Module, ModuleContext};

/// Resolve and open the persistence backend.
///
/// Every failure is logged with the offending source/type before it is
/// returned; the caller is expected to abort startup.
pub fn load_persistence(catalog: &Catalog, descriptor: &UnitDescriptor) -> Result<Arc<dyn Persistence>, LoadError> {
    let open = catalog
        .resolve_persistence(&descriptor.source, &descriptor.type_name)
        .inspect_err(log_failure)?;

    let logger = tracing::info_span!("persistence", backend = %descriptor.type_name);
    let store = open(&descriptor.config, logger).map_err(|e| {
        let err = LoadError::InstantiationFailed {
            unit: "persistence",
            path: descriptor.source.clone(),
            type_name: descriptor.type_name.clone(),
            reason: e.to_string(),
        };
        log_failure(&err);
        err
    })?;

    tracing::info!("Persistence ready: {} from {}", descriptor.type_name, descriptor.source);
    Ok(store)
}

/// Resolve and construct one bot module, handing it the bot handle.
///
/// The module's name doubles as its namespace; a descriptor without a name
/// falls back to the type name.
pub fn load_module(catalog: &Catalog, descriptor: &UnitDescriptor, bot: &Bot) -> Result<Box<dyn Module>, LoadError> {
    let construct = catalog
        .resolve_module(&descriptor.source, &descriptor.type_name)
        .inspect_err(log_failure)?;

    let name = descriptor.module_name();
    let ctx = ModuleContext {
        logger: tracing::info_span!("module", name = %name),
        name: name.clone(),
        bot: bot.clone(),
        config: descriptor.config.clone(),
    };

    let module = construct(ctx).map_err(|e| {
        let err = LoadError::InstantiationFailed {
            unit: "module",
            path: descriptor.source.clone(),
            type_name: descriptor.type_name.clone(),
            reason: e.to_string(),
        };
        log_failure(&err);
        err
    })?;

    tracing::info!("Loaded module '{}' ({} from {})", name, descriptor.type_name, descriptor.source);
    Ok(module)
}

fn log_failure(err: &LoadError) {
    match err {
        LoadError::SourceNotFound { unit, path } => {
            tracing::error!("Couldn't find {} on the {} search path", path, unit)
        }
        LoadError::TypeNotResolvable { path, type_name, .. } => {
            tracing::error!("Couldn't instantiate {}. Maybe it's not defined in {}", type_name, path)
        }
        LoadError::InstantiationFailed { type_name, reason, .. } => {
            tracing::error!("{} failed to start: {}", type_name, reason)
        }
    }
}
