//! Domain layer: the ordered tree and scene entities
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;

pub use arena::{sanitize_id, PointerMode, SceneTree, Traversal, TraversalMode, TreeNode, TreeResult};
pub use entities::*;
pub use error::DomainError;
