//! Build stage: dependency descriptors, configure and compile

use crate::build_systems::{configure_definitions, BuildSystem, BuildSystemContext};
use crate::core::context::BuildContext;
use crate::generators::write_generators;
use crate::recipe::RecipeSpec;
use cpkg_errors::{BuildError, Error};
use cpkg_events::BuildEvent;
use cpkg_types::{DependencyGraph, MatrixPoint};
use std::path::Path;

/// Check that every declared requirement is present in the resolved graph
///
/// # Errors
///
/// Returns `BuildError::MissingDependency` for the first absent requirement.
pub fn require_dependencies(recipe: &RecipeSpec, graph: &DependencyGraph) -> Result<(), Error> {
    for requirement in &recipe.requires {
        if graph.get(&requirement.name).is_none() {
            return Err(BuildError::MissingDependency {
                name: requirement.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

/// Write the dependency descriptors the patched sources include
///
/// # Errors
///
/// Returns an error if a descriptor cannot be written.
pub fn generate(build_dir: &Path, graph: &DependencyGraph, ctx: &BuildContext) -> Result<(), Error> {
    for path in write_generators(build_dir, graph)? {
        ctx.emit_build(BuildEvent::GeneratorWritten {
            session_id: ctx.session_id.clone(),
            path,
        });
    }
    Ok(())
}

/// Configure the build tree with the recipe options and the matrix point
///
/// # Errors
///
/// Returns `BuildError::ConfigureFailed` with the tool's output when the
/// build system rejects the configuration.
pub async fn configure(
    build_system: &dyn BuildSystem,
    bctx: &BuildSystemContext,
    recipe: &RecipeSpec,
    matrix: &MatrixPoint,
) -> Result<(), Error> {
    let definitions = configure_definitions(&recipe.options, matrix, &bctx.build_dir);
    build_system.configure(bctx, &definitions).await
}

/// Compile every default target
///
/// # Errors
///
/// Returns `BuildError::CompileFailed` with the tool's output on failure.
pub async fn compile(build_system: &dyn BuildSystem, bctx: &BuildSystemContext) -> Result<(), Error> {
    build_system.build(bctx).await
}
