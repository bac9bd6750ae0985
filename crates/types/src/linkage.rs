//! Linkage metadata exported to consumers

use serde::{Deserialize, Serialize};

/// Where a linked library comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Built by this recipe and shipped in `lib/`
    Packaged,
    /// Required at link time but provided by the system
    System,
}

/// One entry of the consumer link line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedLibrary {
    pub name: String,
    pub kind: LinkKind,
}

/// Ordered list of libraries a consumer must link against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkageMetadata {
    entries: Vec<LinkedLibrary>,
}

impl LinkageMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a library built by this recipe
    #[must_use]
    pub fn packaged(mut self, name: impl Into<String>) -> Self {
        self.entries.push(LinkedLibrary {
            name: name.into(),
            kind: LinkKind::Packaged,
        });
        self
    }

    /// Append a system library the packaged code links against
    #[must_use]
    pub fn system(mut self, name: impl Into<String>) -> Self {
        self.entries.push(LinkedLibrary {
            name: name.into(),
            kind: LinkKind::System,
        });
        self
    }

    /// Library names in link order, as consumers see them
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn packaged_libs(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.kind == LinkKind::Packaged)
            .map(|e| e.name.as_str())
    }

    pub fn system_libs(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.kind == LinkKind::System)
            .map(|e| e.name.as_str())
    }
}

/// File name of the static archive a library name links to (`libfoo.a`)
#[must_use]
pub fn archive_file_name(lib: &str) -> String {
    format!("lib{lib}.a")
}
