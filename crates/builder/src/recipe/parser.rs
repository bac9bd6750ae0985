//! YAML recipe parser with validation

use super::model::RecipeSpec;
use cpkg_errors::{BuildError, Error};
use std::collections::HashSet;
use std::path::{Component, Path};

/// Parse a YAML recipe from a file
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML is invalid
/// - Required fields are missing
/// - Validation fails
pub async fn parse_yaml_recipe(path: &Path) -> Result<RecipeSpec, Error> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BuildError::RecipeError {
            message: format!("failed to read recipe {}: {e}", path.display()),
        })?;

    parse_yaml_recipe_from_string(&content)
}

/// Parse a YAML recipe from a string
///
/// # Errors
///
/// Returns an error if the YAML is invalid or validation fails.
pub fn parse_yaml_recipe_from_string(content: &str) -> Result<RecipeSpec, Error> {
    let recipe: RecipeSpec = serde_yml::from_str(content).map_err(|e| BuildError::RecipeError {
        message: format!("failed to parse YAML: {e}"),
    })?;

    validate_recipe(&recipe)?;

    Ok(recipe)
}

fn recipe_error(message: impl Into<String>) -> Error {
    BuildError::RecipeError {
        message: message.into(),
    }
    .into()
}

/// Validate a recipe
///
/// # Errors
///
/// Returns `BuildError::RecipeError` describing the first problem found.
pub fn validate_recipe(recipe: &RecipeSpec) -> Result<(), Error> {
    // Validate metadata
    let metadata = &recipe.metadata;
    for (field, value) in [
        ("metadata.name", &metadata.name),
        ("metadata.version", &metadata.version),
        ("metadata.license", &metadata.license),
        ("metadata.homepage", &metadata.homepage),
    ] {
        if value.trim().is_empty() {
            return Err(recipe_error(format!("{field} cannot be empty")));
        }
    }
    // Identity must round-trip through a reference
    cpkg_types::PackageReference::parse(&recipe.reference().to_string())
        .map_err(|e| recipe_error(e.to_string()))?;

    let mut seen = HashSet::new();
    for requirement in &recipe.requires {
        if !seen.insert(requirement.name.as_str()) {
            return Err(recipe_error(format!(
                "requirement {} declared more than once",
                requirement.name
            )));
        }
    }

    for patch in &recipe.patches {
        if patch.anchor.is_empty() || patch.anchor.contains('\n') {
            return Err(recipe_error(format!(
                "patch for {} needs a single-line, non-empty anchor",
                patch.file.display()
            )));
        }
        if patch.insert.is_empty() {
            return Err(recipe_error(format!(
                "patch for {} inserts nothing",
                patch.file.display()
            )));
        }
        if patch
            .file
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(recipe_error(format!(
                "patch target {} must be relative to the source tree",
                patch.file.display()
            )));
        }
    }

    for rule in &recipe.package {
        rule.validate()?;
    }

    if recipe.linkage.packaged_libs().next().is_none() {
        return Err(recipe_error("linkage needs at least one packaged library"));
    }

    Ok(())
}
