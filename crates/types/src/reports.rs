//! Documents handed back to the host after a build

use crate::{OptionSet, PackageReference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Consumer-facing metadata written next to the package layout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub reference: PackageReference,
    pub package_id: String,
    pub settings: BTreeMap<String, String>,
    pub options: OptionSet,
    pub requires: Vec<PackageReference>,
    /// Full link line in order: packaged libraries, then system ones
    pub libs: Vec<String>,
    pub system_libs: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
}

/// Build report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildReport {
    /// Package that was built
    pub reference: PackageReference,
    /// Identifier of this binary configuration
    pub package_id: String,
    /// Root of the package layout (`include/`, `lib/`)
    pub package_dir: PathBuf,
    /// Linkage metadata file
    pub metadata_path: PathBuf,
    /// Headers copied, relative to `package_dir`
    pub headers: Vec<PathBuf>,
    /// Archives copied, relative to `package_dir`
    pub archives: Vec<PathBuf>,
    /// Consumer link line
    pub libs: Vec<String>,
    /// Build duration
    pub duration_ms: u64,
}
