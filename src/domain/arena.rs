//! Arena-backed ordered tree addressed by string identifiers.
//!
//! Nodes never hold references to each other: parents and children are
//! recorded as sanitized identifiers and resolved through the tree, which
//! is the sole owner of every node.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{instrument, trace};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Normalize an identifier: surrounding and internal whitespace is removed.
///
/// Idempotent: `sanitize_id(&sanitize_id(x)) == sanitize_id(x)`.
pub fn sanitize_id(id: &str) -> String {
    id.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Order in which [`Traversal`] visits nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    /// Children are queued in front of the remaining work.
    #[default]
    DepthFirst,
    /// Children are queued behind the remaining work.
    BreadthFirst,
}

/// How [`SceneTree::update_children`] mutates a forward-pointer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMode {
    /// Append, duplicates allowed
    Add,
    /// Remove the first exact match
    Delete,
    /// Drop all existing children and keep exactly this one
    Replace,
}

/// Vertex of a [`SceneTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    identifier: String,
    /// Display label
    pub name: String,
    /// Whether display and expanded-aware traversal descend into children
    pub expanded: bool,
    parent: Option<String>,
    children: Vec<String>,
}

impl TreeNode {
    /// Create a detached node. A UUID is generated when no identifier is given.
    pub fn new(name: impl Into<String>, identifier: Option<&str>) -> Self {
        let identifier = match identifier {
            Some(id) => sanitize_id(id),
            None => Uuid::new_v4().to_string(),
        };
        Self {
            identifier,
            name: name.into(),
            expanded: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Identifier of the owning parent, `None` for roots.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Child identifiers in insertion order.
    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn is_branch(&self) -> bool {
        !self.children.is_empty()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<&str>) {
        self.parent = parent.map(sanitize_id);
    }

    pub(crate) fn update_children(&mut self, identifier: &str, mode: PointerMode) -> TreeResult<()> {
        let identifier = sanitize_id(identifier);
        match mode {
            PointerMode::Add => self.children.push(identifier),
            PointerMode::Delete => {
                let pos = self
                    .children
                    .iter()
                    .position(|c| *c == identifier)
                    .ok_or(DomainError::NotFound(identifier))?;
                self.children.remove(pos);
            }
            PointerMode::Replace => self.children = vec![identifier],
        }
        Ok(())
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.identifier)
    }
}

/// Ordered tree of [`TreeNode`]s.
///
/// Backed by a generational arena with an identifier index for O(1) lookup.
/// Insertion order is kept, so [`SceneTree::iter`] lists every node after
/// the node it was attached to.
#[derive(Debug, Default)]
pub struct SceneTree {
    arena: Arena<TreeNode>,
    index: HashMap<String, Index>,
    order: Vec<Index>,
    root: Option<Index>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node and link it under `parent`.
    ///
    /// Without a parent the node becomes a root; the first root created is
    /// the tree's root.
    ///
    /// # Errors
    /// * [`DomainError::NotFound`] if `parent` does not resolve
    /// * [`DomainError::DuplicateIdentifier`] if the identifier is taken
    #[instrument(level = "trace", skip(self))]
    pub fn create_node(
        &mut self,
        name: &str,
        identifier: Option<&str>,
        parent: Option<&str>,
    ) -> TreeResult<&TreeNode> {
        let parent_idx = match parent {
            Some(p) => Some(self.index_of(p)?),
            None => None,
        };

        let mut node = TreeNode::new(name, identifier);
        if self.index.contains_key(node.identifier()) {
            return Err(DomainError::DuplicateIdentifier(node.identifier.clone()));
        }
        node.set_parent(parent);

        let identifier = node.identifier.clone();
        let node_idx = self.arena.insert(node);
        self.index.insert(identifier.clone(), node_idx);
        self.order.push(node_idx);

        match parent_idx {
            Some(parent_idx) => {
                if let Some(parent) = self.arena.get_mut(parent_idx) {
                    parent.update_children(&identifier, PointerMode::Add)?;
                }
            }
            None if self.root.is_none() => self.root = Some(node_idx),
            None => {}
        }
        trace!("created node {}", identifier);

        self.arena
            .get(node_idx)
            .ok_or(DomainError::NotFound(identifier))
    }

    /// Resolve an identifier to its node.
    pub fn get(&self, identifier: &str) -> TreeResult<&TreeNode> {
        let idx = self.index_of(identifier)?;
        self.arena
            .get(idx)
            .ok_or_else(|| DomainError::NotFound(sanitize_id(identifier)))
    }

    /// Mutable access to a node's label and `expanded` flag.
    pub fn get_mut(&mut self, identifier: &str) -> TreeResult<&mut TreeNode> {
        let idx = self.index_of(identifier)?;
        self.arena
            .get_mut(idx)
            .ok_or_else(|| DomainError::NotFound(sanitize_id(identifier)))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(&sanitize_id(identifier))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The first root node created.
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.and_then(|idx| self.arena.get(idx))
    }

    /// Whether the node has any children.
    pub fn is_branch(&self, identifier: &str) -> TreeResult<bool> {
        Ok(self.get(identifier)?.is_branch())
    }

    /// All nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.order.iter().filter_map(|&idx| self.arena.get(idx))
    }

    /// Mutate `parent`'s forward-pointer list and keep back-links consistent.
    ///
    /// A child attached via `Add` or `Replace` is first detached from any
    /// other parent; adding a child to its own parent again appends a
    /// duplicate entry. Children dropped by `Delete` or `Replace` lose their
    /// back-link once no entry for them remains.
    #[instrument(level = "trace", skip(self))]
    pub fn update_children(
        &mut self,
        parent: &str,
        child: &str,
        mode: PointerMode,
    ) -> TreeResult<()> {
        let parent = sanitize_id(parent);
        let child = sanitize_id(child);
        let parent_idx = self.index_of(&parent)?;
        let child_idx = self.index_of(&child)?;

        match mode {
            PointerMode::Delete => {
                let parent_node = self.node_mut(parent_idx)?;
                parent_node.update_children(&child, PointerMode::Delete)?;
                let still_linked = parent_node.children.contains(&child);
                let node = self.node_mut(child_idx)?;
                if !still_linked && node.parent() == Some(parent.as_str()) {
                    node.set_parent(None);
                }
            }
            PointerMode::Add | PointerMode::Replace => {
                if self.is_ancestor_or_self(&child, &parent) {
                    return Err(DomainError::CycleDetected(child));
                }
                let relinked = self.get(&child)?.parent() == Some(parent.as_str());
                if !(relinked && mode == PointerMode::Add) {
                    self.detach(child_idx)?;
                }
                if mode == PointerMode::Replace {
                    let previous = std::mem::take(&mut self.node_mut(parent_idx)?.children);
                    for old in previous {
                        if let Some(old_idx) = self.index.get(&old).copied() {
                            self.node_mut(old_idx)?.set_parent(None);
                        }
                    }
                }
                self.node_mut(parent_idx)?.update_children(&child, mode)?;
                self.node_mut(child_idx)?.set_parent(Some(&parent));
            }
        }
        Ok(())
    }

    /// Assign a node's back-link, moving it under `parent` or detaching it
    /// when `None`. The forward list of the old and new parent follows.
    pub fn set_parent(&mut self, identifier: &str, parent: Option<&str>) -> TreeResult<()> {
        match parent {
            Some(parent) => {
                if self.get(identifier)?.parent() == Some(sanitize_id(parent).as_str()) {
                    return Ok(());
                }
                self.update_children(parent, identifier, PointerMode::Add)
            }
            None => {
                let idx = self.index_of(identifier)?;
                self.detach(idx)
            }
        }
    }

    /// Lazy traversal from `identifier` that ignores `expanded`.
    pub fn traverse(&self, identifier: &str, mode: TraversalMode) -> TreeResult<Traversal<'_>> {
        let start = self.get(identifier)?;
        Ok(Traversal::new(self, start.identifier(), mode, false))
    }

    /// Lazy traversal from `identifier` that does not descend into collapsed nodes.
    pub fn traverse_expanded(
        &self,
        identifier: &str,
        mode: TraversalMode,
    ) -> TreeResult<Traversal<'_>> {
        let start = self.get(identifier)?;
        Ok(Traversal::new(self, start.identifier(), mode, true))
    }

    /// Number of levels below and including `identifier`.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, identifier: &str) -> TreeResult<usize> {
        let start = self.get(identifier)?;
        let mut max_depth = 0;
        let mut stack = vec![(start, 1)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for child in node.children() {
                if let Ok(child) = self.get(child) {
                    stack.push((child, depth + 1));
                }
            }
        }
        Ok(max_depth)
    }

    /// Render the subtree at `identifier` for display, honoring `expanded`.
    ///
    /// Built bottom-up from a pre-order listing, so depth is not limited by
    /// the call stack.
    pub fn show(&self, identifier: &str) -> TreeResult<Tree<String>> {
        let start = self.get(identifier)?;

        // Pre-order listing; each entry remembers its parent's position.
        let mut listing: Vec<(&TreeNode, Option<usize>)> = Vec::new();
        let mut stack = vec![(start, None)];
        while let Some((node, parent)) = stack.pop() {
            let pos = listing.len();
            listing.push((node, parent));
            if node.expanded {
                for child in node.children().iter().rev() {
                    if let Ok(child) = self.get(child) {
                        stack.push((child, Some(pos)));
                    }
                }
            }
        }

        // Children always follow their parent, so walking backwards finishes
        // every subtree before it is attached.
        let mut leaves: Vec<Vec<Tree<String>>> = listing.iter().map(|_| Vec::new()).collect();
        let mut root = None;
        for (pos, (node, parent)) in listing.iter().enumerate().rev() {
            let mut subtree = Tree::new(node.to_string());
            for leaf in std::mem::take(&mut leaves[pos]).into_iter().rev() {
                subtree.push(leaf);
            }
            match parent {
                Some(parent) => leaves[*parent].push(subtree),
                None => root = Some(subtree),
            }
        }
        root.ok_or_else(|| DomainError::NotFound(start.identifier.clone()))
    }

    fn index_of(&self, identifier: &str) -> TreeResult<Index> {
        let identifier = sanitize_id(identifier);
        self.index
            .get(&identifier)
            .copied()
            .ok_or(DomainError::NotFound(identifier))
    }

    fn is_ancestor_or_self(&self, candidate: &str, identifier: &str) -> bool {
        let mut current = Some(identifier);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.get(id).ok().and_then(TreeNode::parent);
        }
        false
    }

    fn node_mut(&mut self, idx: Index) -> TreeResult<&mut TreeNode> {
        self.arena
            .get_mut(idx)
            .ok_or_else(|| DomainError::NotFound(format!("{:?}", idx)))
    }

    fn detach(&mut self, child_idx: Index) -> TreeResult<()> {
        let child = self.node_mut(child_idx)?;
        let Some(old_parent) = child.parent.take() else {
            return Ok(());
        };
        let identifier = child.identifier.clone();
        if let Some(old_idx) = self.index.get(&old_parent).copied() {
            self.node_mut(old_idx)?
                .children
                .retain(|c| *c != identifier);
        }
        Ok(())
    }
}

/// Lazy, restartable walk over a [`SceneTree`] yielding identifiers.
///
/// Holds a work queue; each step pops the front node and queues its
/// children in front (depth-first) or behind (breadth-first) the rest.
#[derive(Debug, Clone)]
pub struct Traversal<'a> {
    tree: &'a SceneTree,
    queue: VecDeque<&'a str>,
    mode: TraversalMode,
    respect_expanded: bool,
}

impl<'a> Traversal<'a> {
    fn new(tree: &'a SceneTree, start: &'a str, mode: TraversalMode, respect_expanded: bool) -> Self {
        Self {
            tree,
            queue: VecDeque::from([start]),
            mode,
            respect_expanded,
        }
    }
}

impl<'a> Iterator for Traversal<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.queue.pop_front()?;
        let tree = self.tree;
        if let Ok(node) = tree.get(current) {
            if !self.respect_expanded || node.expanded {
                match self.mode {
                    TraversalMode::DepthFirst => {
                        for child in node.children().iter().rev() {
                            self.queue.push_front(child.as_str());
                        }
                    }
                    TraversalMode::BreadthFirst => {
                        self.queue.extend(node.children().iter().map(String::as_str));
                    }
                }
            }
        }
        Some(current)
    }
}
