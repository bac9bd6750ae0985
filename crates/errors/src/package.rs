//! Package reference and resolved-graph error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PackageError {
    #[error("invalid package reference: {input}")]
    InvalidReference { input: String },

    #[error("invalid setting {setting}: {value}")]
    InvalidSetting { setting: String, value: String },

    #[error("invalid dependency graph: {message}")]
    InvalidGraph { message: String },
}

impl UserFacingError for PackageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidReference { .. } => Some("References look like `name/version`."),
            Self::InvalidSetting { .. } => {
                Some("Run `cpkg create --help` to see the accepted setting values.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InvalidReference { .. } => "package.invalid_reference",
            Self::InvalidSetting { .. } => "package.invalid_setting",
            Self::InvalidGraph { .. } => "package.invalid_graph",
        })
    }
}
