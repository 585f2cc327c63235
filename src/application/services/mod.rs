//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (SceneSource, FileSystem)
//! but are themselves concrete structs, not traits.

mod export;
mod import;
mod serialize;

pub use export::{ExportOutput, ExportService};
pub use import::{ImportReport, ImportWarning, SceneImporter};
pub use serialize::{format_float, format_tuple, XtkSerializer, DEFAULT_SCRIPT_URL, DEFAULT_TITLE};
