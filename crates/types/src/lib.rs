#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for cpkg
//!
//! Recipe-independent vocabulary shared by the builder, the configuration
//! layer and the CLI: package references, build-matrix settings, option sets,
//! linkage metadata and the resolved dependency graph.

pub mod linkage;
pub mod options;
pub mod package;
pub mod reports;
pub mod settings;

pub use linkage::{archive_file_name, LinkKind, LinkageMetadata, LinkedLibrary};
pub use options::{OptionSet, OptionValue};
pub use package::{DependencyGraph, PackageReference, ResolvedDependency};
pub use reports::{BuildReport, PackageInfo};
pub use settings::{Arch, BuildType, Compiler, CompilerKind, MatrixPoint, Os, Setting};

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Tty,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Tty
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}
