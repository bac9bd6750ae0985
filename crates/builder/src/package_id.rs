//! Identifier of one binary configuration of a recipe

use crate::recipe::RecipeSpec;
use cpkg_types::MatrixPoint;
use sha2::{Digest, Sha256};

/// SHA-256 over everything that changes the produced binary
///
/// Hashes the reference, the matrix values of the axes the recipe declares,
/// the option set and the requirements. Requirements are sorted first since
/// their declared order carries no meaning. Matrix axes the recipe does not
/// declare do not contribute.
#[must_use]
pub fn compute_package_id(recipe: &RecipeSpec, matrix: &MatrixPoint) -> String {
    let mut hasher = Sha256::new();
    let mut line = |key: &str, value: &str| {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"\n");
    };

    line("reference", &recipe.reference().to_string());
    for (setting, value) in matrix.values_for(&recipe.settings) {
        line(&format!("settings.{setting}"), &value);
    }
    for (name, value) in recipe.options.iter() {
        line(&format!("options.{name}"), &value.to_string());
    }

    let mut requires = recipe.requires.clone();
    requires.sort();
    for requirement in &requires {
        line("requires", &requirement.to_string());
    }

    format!("{:x}", hasher.finalize())
}
