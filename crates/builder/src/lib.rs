#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]
//! Recipe lifecycle orchestration for cpkg
//!
//! This crate takes a declarative recipe through source acquisition,
//! patching, dependency descriptor generation, configure, compile,
//! packaging and metadata export. Cloning and the build tool are reached
//! through the [`SourceFetcher`] and [`BuildSystem`] ports.

mod build_systems;
mod core;
mod fetch;
mod generators;
mod metadata;
mod package_id;
mod packaging;
mod patch;
pub mod recipe;
mod stages;
mod utils;

pub use build_systems::{
    configure_definitions, BuildCommandResult, BuildSystem, BuildSystemContext, CMakeBuildSystem,
    Definitions,
};
pub use core::builder::{BuildRequest, Builder};
pub use core::config::BuildConfig;
pub use core::context::BuildContext;
pub use core::workspace::{PackageLocation, StagedPackage, Workspace};
pub use fetch::{project_name, GitFetcher, SourceFetcher};
pub use generators::{render_build_info, render_find_module, write_generators, BUILD_INFO_FILE};
pub use metadata::{package_info, read_package_info, write_package_info};
pub use package_id::compute_package_id;
pub use packaging::{package_layout, verify_linkage, CopyRule, PackageRoots, PackagedFiles, RuleRoot};
pub use patch::{apply_patch, patch_text, PatchOutcome, TextPatch};
pub use recipe::{
    builtin, parse_yaml_recipe, parse_yaml_recipe_from_string, validate_recipe, RecipeSpec,
    BUILTIN_RECIPES,
};
