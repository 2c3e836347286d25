//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{AttackTreeService, DocumentStore, JsonFileStore};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Document editing service, bound to `settings.document_path`
    pub tree: AttackTreeService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let store: Arc<dyn DocumentStore> =
            Arc::new(JsonFileStore::new(fs.clone(), settings.document_path.clone()));
        let tree = AttackTreeService::new(store, settings.root_name.clone())
            .with_edge_color(settings.edge_color.clone());

        Self { settings, fs, tree }
    }
}
