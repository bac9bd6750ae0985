//! Lifecycle stages
//!
//! Each stage is a free function over the recipe and the directories of the
//! current invocation. The orchestrator in `core::builder` calls them in
//! order and owns timing and failure reporting.

pub mod build;
pub mod package;
pub mod source;

pub use build::{compile, configure, generate, require_dependencies};
pub use package::{export_metadata, package};
pub use source::fetch_and_patch;
