//! TOML scene documents: a file-backed stand-in for the live host scene.
//!
//! ```toml
//! [[nodes]]
//! id = "vtkMRMLModelHierarchyNode1"
//! name = "Brain"
//! kind = "model_hierarchy"
//!
//! [[nodes]]
//! id = "vtkMRMLModelNode4"
//! name = "Cortex"
//! kind = "model"
//! storage = "cortex.vtk"
//! display = { color = [1.0, 0.8, 0.7], opacity = 0.5, visible = true }
//!
//! # places the cortex model under "Brain"
//! [[nodes]]
//! id = "vtkMRMLModelHierarchyNode2"
//! kind = "model_hierarchy"
//! parent = "vtkMRMLModelHierarchyNode1"
//! model = "vtkMRMLModelNode4"
//!
//! [[viewports]]
//! background = "#000000"
//! camera = [0.0, 0.0, 500.0]
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{sanitize_id, DisplayProperties, NodeKind, SceneNode};
use crate::infrastructure::traits::{FileSystem, SceneSource};
use crate::infrastructure::{InfraError, InfraResult};

/// One `[[nodes]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    /// Defaults to the identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: NodeKind,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayRecord>,
}

impl NodeRecord {
    pub fn new(id: &str, name: &str, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            name: Some(name.to_string()),
            kind,
            hidden: false,
            parent: None,
            model: None,
            storage: None,
            display: None,
        }
    }

    pub fn model(id: &str, name: &str) -> Self {
        Self::new(id, name, NodeKind::Model)
    }

    pub fn hierarchy(id: &str, name: &str) -> Self {
        Self::new(id, name, NodeKind::ModelHierarchy)
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn wrapping(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn with_storage(mut self, file: &str) -> Self {
        self.storage = Some(file.to_string());
        self
    }

    pub fn with_display(mut self, color: [f64; 3], opacity: f64, visible: bool) -> Self {
        self.display = Some(DisplayRecord {
            color,
            opacity,
            visible,
        });
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("node with empty id".to_string());
        }
        if let Some(display) = &self.display {
            if !(0.0..=1.0).contains(&display.opacity) {
                return Err(format!(
                    "{}: opacity {} outside 0..1",
                    self.id, display.opacity
                ));
            }
            if display.color.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(format!("{}: color channel outside 0..1", self.id));
            }
        }
        Ok(())
    }
}

/// Display attributes of a model entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRecord {
    #[serde(default = "default_color")]
    pub color: [f64; 3],
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_color() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// One `[[viewports]]` entry; missing values surface as host query failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<[f64; 3]>,
}

impl ViewportRecord {
    pub fn new(background: &str, camera: [f64; 3]) -> Self {
        Self {
            background: Some(background.to_string()),
            camera: Some(camera),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self.camera {
            Some(camera) if camera.iter().any(|c| !c.is_finite()) => {
                Err(format!("camera position {:?} is not finite", camera))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSceneDocument {
    nodes: Vec<NodeRecord>,
    viewports: Vec<ViewportRecord>,
}

/// In-memory scene implementing [`SceneSource`].
#[derive(Debug, Clone, Default)]
pub struct SceneDocument {
    nodes: Vec<SceneNode>,
    by_id: HashMap<String, usize>,
    hierarchy_by_model: HashMap<String, usize>,
    storage: HashMap<String, String>,
    display: HashMap<String, DisplayProperties>,
    viewports: Vec<ViewportRecord>,
}

impl SceneDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML scene description. `origin` is only used in error messages.
    #[instrument(level = "debug", skip(content))]
    pub fn from_toml_str(content: &str, origin: &Path) -> InfraResult<Self> {
        let raw: RawSceneDocument =
            toml::from_str(content).map_err(|e| InfraError::scene_format(origin, e.to_string()))?;

        let mut doc = Self::new();
        for record in raw.nodes {
            doc.push_node(record)
                .map_err(|message| InfraError::scene_format(origin, message))?;
        }
        for (index, viewport) in raw.viewports.into_iter().enumerate() {
            viewport.validate().map_err(|message| {
                InfraError::scene_format(origin, format!("viewport {}: {}", index, message))
            })?;
            doc.push_viewport(viewport);
        }
        debug!(
            "loaded {} nodes, {} viewports",
            doc.nodes.len(),
            doc.viewports.len()
        );
        Ok(doc)
    }

    /// Read and parse a scene file.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> InfraResult<Self> {
        let content = fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("read scene {}", path.display()), e))?;
        Self::from_toml_str(&content, path)
    }

    /// Append a node; identifiers must be unique within the document.
    ///
    /// Lookups go through [`sanitize_id`], so `"Model 4"` and `"Model4"`
    /// name the same node, exactly as they would in a [`SceneTree`].
    ///
    /// [`SceneTree`]: crate::domain::SceneTree
    pub fn push_node(&mut self, record: NodeRecord) -> Result<(), String> {
        record.validate()?;
        let key = sanitize_id(&record.id);
        if self.by_id.contains_key(&key) {
            return Err(format!("duplicate node id: {}", record.id));
        }

        let pos = self.nodes.len();
        if let Some(file) = &record.storage {
            self.storage.insert(key.clone(), file.clone());
        }
        if let Some(display) = record.display {
            self.display.insert(
                key.clone(),
                DisplayProperties {
                    color: display.color,
                    opacity: display.opacity,
                    visible: display.visible,
                },
            );
        }
        if record.kind == NodeKind::ModelHierarchy {
            if let Some(model) = &record.model {
                self.hierarchy_by_model
                    .entry(sanitize_id(model))
                    .or_insert(pos);
            }
        }
        self.by_id.insert(key, pos);
        self.nodes.push(SceneNode {
            name: record.name.unwrap_or_else(|| record.id.clone()),
            id: record.id,
            kind: record.kind,
            hide_from_editors: record.hidden,
            parent: record.parent,
            model: record.model,
        });
        Ok(())
    }

    pub fn push_viewport(&mut self, viewport: ViewportRecord) {
        self.viewports.push(viewport);
    }

    /// Update a model's display attributes, as the host would between exports.
    pub fn set_display(&mut self, id: &str, display: DisplayProperties) {
        self.display.insert(sanitize_id(id), display);
    }
}

impl SceneSource for SceneDocument {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn nth_node(&self, n: usize) -> Option<&SceneNode> {
        self.nodes.get(n)
    }

    fn node_by_id(&self, id: &str) -> Option<&SceneNode> {
        self.by_id
            .get(&sanitize_id(id))
            .and_then(|&pos| self.nodes.get(pos))
    }

    fn hierarchy_node_for_model(&self, model_id: &str) -> Option<&SceneNode> {
        self.hierarchy_by_model
            .get(&sanitize_id(model_id))
            .and_then(|&pos| self.nodes.get(pos))
    }

    fn storage_file(&self, id: &str) -> Option<String> {
        self.storage.get(&sanitize_id(id)).cloned()
    }

    fn display_properties(&self, id: &str) -> Option<DisplayProperties> {
        self.display.get(&sanitize_id(id)).copied()
    }

    fn background_color(&self, viewport: usize) -> Option<String> {
        self.viewports.get(viewport)?.background.clone()
    }

    fn camera_position(&self, viewport: usize) -> Option<[f64; 3]> {
        self.viewports.get(viewport)?.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_hierarchy_node_is_indexed_by_model() {
        let mut doc = SceneDocument::new();
        doc.push_node(NodeRecord::model("m1", "Skull")).unwrap();
        doc.push_node(NodeRecord::hierarchy("h1", "Skull wrapper").wrapping("m1"))
            .unwrap();

        let wrapper = doc.hierarchy_node_for_model("m1").unwrap();
        assert_eq!(wrapper.id, "h1");
        assert!(doc.hierarchy_node_for_model("h1").is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut doc = SceneDocument::new();
        doc.push_node(NodeRecord::model("m1", "a")).unwrap();
        assert!(doc.push_node(NodeRecord::model("m1", "b")).is_err());
    }

    #[test]
    fn unknown_kinds_parse_as_other() {
        let doc = SceneDocument::from_toml_str(
            "[[nodes]]\nid = \"v1\"\nkind = \"scalar_volume\"\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(doc.nth_node(0).unwrap().kind, NodeKind::Other);
        assert_eq!(doc.nth_node(0).unwrap().name, "v1");
    }
}
