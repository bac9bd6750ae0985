//! Package references and the resolved dependency graph

use cpkg_errors::PackageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// `name/version` identifier of a recipe or one of its requirements
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageReference {
    pub name: String,
    pub version: String,
}

impl PackageReference {
    /// Create a new reference
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse a reference written as `name/version` or `name@version`
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidReference` when the separator is missing,
    /// either half is empty, or a half contains whitespace or another separator.
    pub fn parse(s: &str) -> Result<Self, PackageError> {
        let invalid = || PackageError::InvalidReference {
            input: s.to_string(),
        };

        let s = s.trim();
        let (name, version) = s.split_once(['/', '@']).ok_or_else(invalid)?;

        let valid_part = |part: &str| {
            !part.is_empty()
                && !part
                    .chars()
                    .any(|c| c.is_whitespace() || c == '/' || c == '@')
        };
        if !valid_part(name) || !valid_part(version) {
            return Err(invalid());
        }

        Ok(Self::new(name, version))
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl FromStr for PackageReference {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PackageReference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageReference {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn default_include_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("include")]
}

fn default_lib_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("lib")]
}

/// One dependency as resolved by the host package manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub reference: PackageReference,
    /// Package folder of the dependency in the host's cache
    pub root: PathBuf,
    #[serde(default = "default_include_dirs")]
    pub include_dirs: Vec<PathBuf>,
    #[serde(default = "default_lib_dirs")]
    pub lib_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub libs: Vec<String>,
    #[serde(default)]
    pub system_libs: Vec<String>,
}

impl ResolvedDependency {
    /// Include directories made absolute against `root`
    #[must_use]
    pub fn absolute_include_dirs(&self) -> Vec<PathBuf> {
        absolutize(&self.root, &self.include_dirs)
    }

    /// Library directories made absolute against `root`
    #[must_use]
    pub fn absolute_lib_dirs(&self) -> Vec<PathBuf> {
        absolutize(&self.root, &self.lib_dirs)
    }
}

fn absolutize(root: &Path, dirs: &[PathBuf]) -> Vec<PathBuf> {
    dirs.iter()
        .map(|dir| {
            if dir.is_absolute() {
                dir.clone()
            } else {
                root.join(dir)
            }
        })
        .collect()
}

/// Resolved dependency graph handed in by the host, in link order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    pub dependencies: Vec<ResolvedDependency>,
}

impl DependencyGraph {
    /// Parse the JSON form of a resolved graph
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidGraph` if the document is malformed or
    /// names the same package twice.
    pub fn from_json(content: &str) -> Result<Self, PackageError> {
        let graph: Self =
            serde_json::from_str(content).map_err(|e| PackageError::InvalidGraph {
                message: e.to_string(),
            })?;

        for (idx, dep) in graph.dependencies.iter().enumerate() {
            if graph.dependencies[..idx]
                .iter()
                .any(|other| other.reference.name == dep.reference.name)
            {
                return Err(PackageError::InvalidGraph {
                    message: format!("{} resolved more than once", dep.reference.name),
                });
            }
        }

        Ok(graph)
    }

    /// Look up a resolved dependency by package name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedDependency> {
        self.dependencies.iter().find(|d| d.reference.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.dependencies.iter()
    }
}
