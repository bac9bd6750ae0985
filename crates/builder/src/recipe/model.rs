//! Declarative recipe format
//!
//! A recipe is plain data: identity, matrix axes, requirements, where the
//! source lives and how to patch it, the fixed option set, copy rules and
//! the linkage list. The lifecycle reads it but never mutates it.

use crate::packaging::CopyRule;
use crate::patch::TextPatch;
use cpkg_types::{LinkageMetadata, OptionSet, PackageReference, Setting};
use serde::{Deserialize, Serialize};

/// Complete recipe structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSpec {
    /// Package metadata (required)
    pub metadata: Metadata,

    /// Matrix axes the binary varies over
    #[serde(default)]
    pub settings: Vec<Setting>,

    /// Upstream packages, display order only
    #[serde(default)]
    pub requires: Vec<PackageReference>,

    /// Source location (defaults to `<homepage>.git`)
    #[serde(default)]
    pub source: Source,

    /// Patches applied in order after cloning
    #[serde(default)]
    pub patches: Vec<TextPatch>,

    /// Fixed build options, never exposed to consumers
    #[serde(default)]
    pub options: OptionSet,

    /// Copy rules producing the package layout
    #[serde(default)]
    pub package: Vec<CopyRule>,

    /// Libraries consumers link against, in order
    pub linkage: LinkageMetadata,
}

/// Package metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub license: String,
    pub homepage: String,
    /// Where the recipe itself is maintained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Git source specification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<String>,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
}

impl RecipeSpec {
    /// `name/version` of the recipe
    #[must_use]
    pub fn reference(&self) -> PackageReference {
        PackageReference::new(&self.metadata.name, &self.metadata.version)
    }

    /// URL cloned by the source stage
    #[must_use]
    pub fn clone_url(&self) -> String {
        self.source.git.clone().unwrap_or_else(|| {
            format!("{}.git", self.metadata.homepage.trim_end_matches('/'))
        })
    }
}
