//! Export service
//!
//! Runs import and serialization for one viewport and hands out the finished
//! document. Nothing reaches the output path unless every step succeeded.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::services::import::{ImportReport, ImportWarning, SceneImporter};
use crate::application::services::serialize::XtkSerializer;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::Viewport;
use crate::infrastructure::traits::{FileSystem, SceneSource};

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// The complete HTML document
    pub document: String,
    /// Nodes left out of the document
    pub warnings: Vec<ImportWarning>,
    /// Tree nodes written, synthetic root included
    pub node_count: usize,
}

/// Scene to WebGL export service.
pub struct ExportService {
    source: Arc<dyn SceneSource>,
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl ExportService {
    /// Create a new export service.
    pub fn new(source: Arc<dyn SceneSource>, fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self {
            source,
            fs,
            settings,
        }
    }

    /// Mirror the scene into a fresh tree.
    pub fn import(&self) -> ApplicationResult<ImportReport> {
        SceneImporter::new(self.settings.self_parent).import(self.source.as_ref())
    }

    /// Camera and background of a viewport; both must be known and the
    /// camera position finite.
    pub fn viewport(&self, index: usize) -> ApplicationResult<Viewport> {
        let what = format!("viewport {}", index);
        let background = self
            .source
            .background_color(index)
            .ok_or_else(|| ApplicationError::host_query(what.clone(), "background color"))?;
        let camera_position = self
            .source
            .camera_position(index)
            .ok_or_else(|| ApplicationError::host_query(what.clone(), "camera"))?;
        if camera_position.iter().any(|c| !c.is_finite()) {
            return Err(ApplicationError::host_query(what, "finite camera position"));
        }
        Ok(Viewport {
            background,
            camera_position,
        })
    }

    /// Build the document for `viewport` in memory.
    #[instrument(level = "debug", skip(self))]
    pub fn export(&self, viewport: usize) -> ApplicationResult<ExportOutput> {
        let report = self.import()?;
        let view = self.viewport(viewport)?;
        let serializer = XtkSerializer::new(
            &self.settings.render.title,
            &self.settings.render.script_url,
        );
        let document = serializer.serialize(&report.tree, self.source.as_ref(), &view)?;
        debug!("document: {} bytes", document.len());

        Ok(ExportOutput {
            document,
            warnings: report.warnings,
            node_count: report.tree.len(),
        })
    }

    /// Build the document and write it to `path` atomically.
    #[instrument(level = "debug", skip(self))]
    pub fn export_to(&self, path: &Path, viewport: usize) -> ApplicationResult<ExportOutput> {
        let output = self.export(viewport)?;

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !self.fs.exists(dir) {
                self.fs
                    .create_dir_all(dir)
                    .map_err(|e| ApplicationError::io("create output directory", dir, e))?;
            }
        }
        self.fs
            .write_atomic(path, &output.document)
            .map_err(|e| ApplicationError::io("write document", path, e))?;
        info!("exported {} nodes to {}", output.node_count, path.display());

        Ok(output)
    }
}
