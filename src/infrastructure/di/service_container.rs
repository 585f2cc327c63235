//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::ExportService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, SceneSource};
use crate::infrastructure::{InfraResult, SceneDocument};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    /// Load a scene document through the container's filesystem.
    pub fn load_scene(&self, path: &Path) -> InfraResult<Arc<dyn SceneSource>> {
        let doc = SceneDocument::load(self.fs.as_ref(), path)?;
        Ok(Arc::new(doc))
    }

    /// Export service bound to `source`.
    pub fn export_service(&self, source: Arc<dyn SceneSource>) -> ExportService {
        ExportService::new(source, Arc::clone(&self.fs), Arc::clone(&self.settings))
    }
}
