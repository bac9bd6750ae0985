//! Recipe lifecycle error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("recipe error: {message}")]
    RecipeError { message: String },

    #[error("missing dependency in resolved graph: {name}")]
    MissingDependency { name: String },

    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// `stage` names the lifecycle stage that needed the tool
    #[error("required tool not found: {tool}")]
    ToolNotFound { tool: String, stage: &'static str },

    #[error("source acquisition failed for {url}: {message}")]
    AcquisitionFailed { url: String, message: String },

    #[error("patch anchor not found in {file}: {anchor}")]
    PatchAnchorNotFound { file: String, anchor: String },

    #[error("patch already applied to {file}: {anchor}")]
    PatchAlreadyApplied { file: String, anchor: String },

    #[error("configure failed (exit status {status:?}):\n{output}")]
    ConfigureFailed { status: Option<i32>, output: String },

    #[error("compile failed (exit status {status:?}):\n{output}")]
    CompileFailed { status: Option<i32>, output: String },

    #[error("packaging failed: {message}")]
    PackagingFailed { message: String },
}

impl BuildError {
    /// Lifecycle stage the error aborted
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::RecipeError { .. } | Self::MissingDependency { .. } => "prepare",
            Self::InvalidUrl { .. }
            | Self::AcquisitionFailed { .. }
            | Self::PatchAnchorNotFound { .. }
            | Self::PatchAlreadyApplied { .. } => "source",
            Self::ToolNotFound { stage, .. } => *stage,
            Self::ConfigureFailed { .. } => "configure",
            Self::CompileFailed { .. } => "compile",
            Self::PackagingFailed { .. } => "package",
        }
    }
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(format!("[{}] {self}", self.stage()))
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::AcquisitionFailed { .. } | Self::InvalidUrl { .. } => {
                Some("Check network access and that the upstream repository still exists.")
            }
            Self::PatchAnchorNotFound { .. } => {
                Some("The upstream sources changed; update the recipe's patch anchors.")
            }
            Self::PatchAlreadyApplied { .. } => {
                Some("Run the source stage against a fresh checkout.")
            }
            Self::MissingDependency { .. } => {
                Some("Add the dependency to the resolved graph passed with --deps.")
            }
            Self::ToolNotFound { .. } => {
                Some("Install the tool or point the configuration at its location.")
            }
            Self::RecipeError { .. } => Some("Correct the recipe definition before retrying."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::RecipeError { .. } => "build.recipe_error",
            Self::MissingDependency { .. } => "build.missing_dependency",
            Self::InvalidUrl { .. } => "build.invalid_url",
            Self::ToolNotFound { .. } => "build.tool_not_found",
            Self::AcquisitionFailed { .. } => "build.acquisition_failed",
            Self::PatchAnchorNotFound { .. } => "build.patch_anchor_not_found",
            Self::PatchAlreadyApplied { .. } => "build.patch_already_applied",
            Self::ConfigureFailed { .. } => "build.configure_failed",
            Self::CompileFailed { .. } => "build.compile_failed",
            Self::PackagingFailed { .. } => "build.packaging_failed",
        };
        Some(code)
    }
}
