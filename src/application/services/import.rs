//! Scene import: mirror the host's model hierarchy into a [`SceneTree`].

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, instrument, warn};

use crate::application::ApplicationResult;
use crate::domain::{
    DomainError, SceneNode, SceneTree, SelfParentPolicy, SCENE_ROOT_ID, SCENE_ROOT_NAME,
};
use crate::infrastructure::traits::SceneSource;

/// Node left out of the tree. Not fatal: the export carries on without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportWarning {
    /// The node is its own parent, or sits on a parent loop.
    CycleGuard { id: String },
    /// The node's parent never made it into the tree.
    Orphan { id: String, parent: String },
}

impl ImportWarning {
    pub fn id(&self) -> &str {
        match self {
            ImportWarning::CycleGuard { id } | ImportWarning::Orphan { id, .. } => id,
        }
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportWarning::CycleGuard { id } => write!(f, "{}: parent loop, node skipped", id),
            ImportWarning::Orphan { id, parent } => {
                write!(f, "{}: parent {} unresolved, node skipped", id, parent)
            }
        }
    }
}

/// Result of one import.
#[derive(Debug)]
pub struct ImportReport {
    pub tree: SceneTree,
    pub warnings: Vec<ImportWarning>,
}

/// Where a node hangs in the host hierarchy.
enum ParentLink<'s> {
    Root,
    Node(&'s SceneNode),
    Dangling(String),
}

/// Why an ancestor walk stopped short of the tree.
enum Blocked<'s> {
    SelfParent(&'s SceneNode),
    Dangling(&'s SceneNode, String),
    Loop(String),
    Ineligible,
}

/// Builds a [`SceneTree`] from a [`SceneSource`].
///
/// Parents are always inserted before their children; ancestors are
/// resolved with an explicit work stack.
pub struct SceneImporter {
    policy: SelfParentPolicy,
    tree: SceneTree,
    decided: HashSet<String>,
    warnings: Vec<ImportWarning>,
}

impl Default for SceneImporter {
    fn default() -> Self {
        Self::new(SelfParentPolicy::default())
    }
}

impl SceneImporter {
    pub fn new(policy: SelfParentPolicy) -> Self {
        Self {
            policy,
            tree: SceneTree::new(),
            decided: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Import every exportable node of `source`, in host order.
    #[instrument(level = "debug", skip(self, source))]
    pub fn import(&mut self, source: &dyn SceneSource) -> ApplicationResult<ImportReport> {
        // Reset state for a fresh import
        self.tree = SceneTree::new();
        self.decided.clear();
        self.warnings.clear();

        self.tree
            .create_node(SCENE_ROOT_NAME, Some(SCENE_ROOT_ID), None)?;

        for n in 0..source.node_count() {
            if let Some(node) = source.nth_node(n) {
                self.resolve(source, node)?;
            }
        }
        debug!(
            "imported {} nodes, {} skipped",
            self.tree.len() - 1,
            self.warnings.len()
        );

        Ok(ImportReport {
            tree: std::mem::take(&mut self.tree),
            warnings: std::mem::take(&mut self.warnings),
        })
    }

    fn resolve<'s>(&mut self, source: &'s dyn SceneSource, start: &'s SceneNode) -> ApplicationResult<()> {
        if !start.is_exportable() {
            debug!("ignoring {}", start);
            return Ok(());
        }
        if self.decided.contains(&start.id) {
            return Ok(());
        }

        // Walk up until the parent is decided or the scene root is reached.
        // Each entry is (node, identifier of its parent).
        let mut chain: Vec<(&'s SceneNode, String)> = Vec::new();
        let mut current = start;
        let walk = loop {
            if chain.iter().any(|(n, _)| n.id == current.id) {
                break Err(Blocked::Loop(current.id.clone()));
            }
            match parent_of(source, current) {
                ParentLink::Root => {
                    chain.push((current, SCENE_ROOT_ID.to_string()));
                    break Ok(());
                }
                ParentLink::Dangling(parent) => break Err(Blocked::Dangling(current, parent)),
                ParentLink::Node(parent) if parent.id == current.id => {
                    break Err(Blocked::SelfParent(current));
                }
                ParentLink::Node(parent) => {
                    chain.push((current, parent.id.clone()));
                    if self.decided.contains(&parent.id) {
                        break Ok(());
                    }
                    if !parent.is_exportable() {
                        break Err(Blocked::Ineligible);
                    }
                    current = parent;
                }
            }
        };

        match walk {
            Ok(()) => self.insert_chain(source, chain),
            Err(blocked) => self.drop_chain(chain, blocked),
        }
    }

    fn insert_chain(
        &mut self,
        source: &dyn SceneSource,
        chain: Vec<(&SceneNode, String)>,
    ) -> ApplicationResult<()> {
        for (node, parent) in chain.into_iter().rev() {
            self.decided.insert(node.id.clone());
            if represented_by_model(source, node) {
                debug!("{} is represented by its model node", node);
                continue;
            }
            if !self.tree.contains(&parent) {
                self.warn(ImportWarning::Orphan {
                    id: node.id.clone(),
                    parent,
                });
                continue;
            }
            self.tree
                .create_node(&node.name, Some(&node.id), Some(&parent))?;
        }
        Ok(())
    }

    fn drop_chain(&mut self, chain: Vec<(&SceneNode, String)>, blocked: Blocked<'_>) -> ApplicationResult<()> {
        let mut in_loop = chain.len();
        match blocked {
            Blocked::SelfParent(node) => {
                if self.policy == SelfParentPolicy::Reject {
                    return Err(DomainError::SelfParent(node.id.clone()).into());
                }
                self.decided.insert(node.id.clone());
                self.warn(ImportWarning::CycleGuard {
                    id: node.id.clone(),
                });
            }
            Blocked::Dangling(node, parent) => {
                self.decided.insert(node.id.clone());
                self.warn(ImportWarning::Orphan {
                    id: node.id.clone(),
                    parent,
                });
            }
            Blocked::Loop(id) => {
                in_loop = chain
                    .iter()
                    .position(|(n, _)| n.id == id)
                    .unwrap_or(chain.len());
            }
            Blocked::Ineligible => {}
        }

        for (pos, (node, parent)) in chain.into_iter().enumerate().rev() {
            self.decided.insert(node.id.clone());
            let warning = if pos >= in_loop {
                ImportWarning::CycleGuard {
                    id: node.id.clone(),
                }
            } else {
                ImportWarning::Orphan {
                    id: node.id.clone(),
                    parent,
                }
            };
            self.warn(warning);
        }
        Ok(())
    }

    fn warn(&mut self, warning: ImportWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// A hierarchy node gives way to its model only if the host knows that model.
fn represented_by_model(source: &dyn SceneSource, node: &SceneNode) -> bool {
    node.wrapped_model()
        .and_then(|id| source.node_by_id(id))
        .is_some_and(SceneNode::is_model)
}

/// Models hang wherever their hierarchy node hangs; hierarchy nodes carry their own link.
fn parent_of<'s>(source: &'s dyn SceneSource, node: &SceneNode) -> ParentLink<'s> {
    let parent_id = if node.is_model() {
        source
            .hierarchy_node_for_model(&node.id)
            .and_then(|h| h.parent.clone())
    } else {
        node.parent.clone()
    };

    match parent_id {
        None => ParentLink::Root,
        Some(id) => match source.node_by_id(&id) {
            Some(parent) => ParentLink::Node(parent),
            None => ParentLink::Dangling(id),
        },
    }
}
