//! Mirror a medical-imaging scene graph into an ordered tree and serialize
//! it as a standalone XTK/WebGL HTML page.
//!
//! Layers, innermost first:
//! - [`domain`]: the identifier-addressed [`domain::SceneTree`] and scene entities
//! - [`application`]: import, serialization and the export service
//! - [`infrastructure`]: host scene access, scene documents, filesystem
//! - [`cli`]: the `webgl-export` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
