//! I/O boundary traits for testability
//!
//! These traits abstract the host scene and the filesystem, allowing
//! services to be tested with in-memory implementations.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::domain::{DisplayProperties, SceneNode};

/// Read-only access to the host's scene state.
///
/// Everything is queried on demand; callers must not assume two calls
/// return the same answer if the host changed in between.
pub trait SceneSource: Send + Sync {
    /// Number of nodes in the scene.
    fn node_count(&self) -> usize;

    /// Node at position `n` in host iteration order, `None` for empty slots.
    fn nth_node(&self, n: usize) -> Option<&SceneNode>;

    /// Look a node up by its host identifier.
    fn node_by_id(&self, id: &str) -> Option<&SceneNode>;

    /// Hierarchy node standing for the given model node, if any.
    fn hierarchy_node_for_model(&self, model_id: &str) -> Option<&SceneNode>;

    /// File the model's geometry is stored in.
    fn storage_file(&self, id: &str) -> Option<String>;

    /// Current display attributes of a model node.
    fn display_properties(&self, id: &str) -> Option<DisplayProperties>;

    /// Background color of a 3D viewport.
    fn background_color(&self, viewport: usize) -> Option<String>;

    /// Camera position of a 3D viewport.
    fn camera_position(&self, viewport: usize) -> Option<[f64; 3]>;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the file's content atomically; readers see old or new, never partial.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}
