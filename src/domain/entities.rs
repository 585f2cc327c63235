//! Domain entities: scene records supplied by the host

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the synthetic root every imported tree starts with.
pub const SCENE_ROOT_ID: &str = "scene";
/// Display name of the synthetic root.
pub const SCENE_ROOT_NAME: &str = "Scene";

/// Host class of a scene node, as far as the exporter cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Renderable surface model (leaf)
    Model,
    /// Grouping node of the model hierarchy
    ModelHierarchy,
    /// Anything else the host keeps in its scene (volumes, cameras, ...)
    #[serde(other)]
    Other,
}

/// Read-only view of one host scene node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    /// Host-internal nodes are hidden from editors and never exported
    pub hide_from_editors: bool,
    /// Parent link of a hierarchy node
    pub parent: Option<String>,
    /// Model node a hierarchy node stands for
    pub model: Option<String>,
}

impl SceneNode {
    pub fn is_model(&self) -> bool {
        self.kind == NodeKind::Model
    }

    pub fn is_hierarchy(&self) -> bool {
        self.kind == NodeKind::ModelHierarchy
    }

    /// Whether the importer considers this node at all.
    pub fn is_exportable(&self) -> bool {
        match self.kind {
            NodeKind::Model => !self.hide_from_editors,
            NodeKind::ModelHierarchy => true,
            NodeKind::Other => false,
        }
    }

    /// Model identifier a hierarchy node refers to, if any.
    ///
    /// The reference may dangle; only the host can tell.
    pub fn wrapped_model(&self) -> Option<&str> {
        if self.is_hierarchy() {
            self.model.as_deref()
        } else {
            None
        }
    }
}

impl fmt::Display for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Display attributes of a model node, read at serialization time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayProperties {
    /// RGB, each channel 0.0..=1.0
    pub color: [f64; 3],
    /// 0.0..=1.0
    pub opacity: f64,
    pub visible: bool,
}

/// State of one 3D viewport used to configure the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// CSS color, e.g. `#000000`
    pub background: String,
    pub camera_position: [f64; 3],
}

/// What the importer does with a node that names itself as parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfParentPolicy {
    /// Drop the node and report a warning
    #[default]
    Skip,
    /// Abort the import
    Reject,
}

impl fmt::Display for SelfParentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelfParentPolicy::Skip => write!(f, "skip"),
            SelfParentPolicy::Reject => write!(f, "reject"),
        }
    }
}
