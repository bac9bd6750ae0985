//! Recipe model, YAML loading and built-in recipes

pub mod httpmockserver;
pub mod model;
pub mod parser;

pub use model::{Metadata, RecipeSpec, Source};
pub use parser::{parse_yaml_recipe, parse_yaml_recipe_from_string, validate_recipe};

/// Names accepted by [`builtin`]
pub const BUILTIN_RECIPES: &[&str] = &[httpmockserver::NAME];

/// Look up a recipe shipped with cpkg
#[must_use]
pub fn builtin(name: &str) -> Option<RecipeSpec> {
    match name {
        httpmockserver::NAME => Some(httpmockserver::recipe()),
        _ => None,
    }
}
