use cpkg_types::PackageReference;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::FailureContext;

/// Steps of the recipe lifecycle, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    Source,
    Generate,
    Configure,
    Compile,
    Package,
    Metadata,
}

impl BuildPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Generate => "generate",
            Self::Configure => "configure",
            Self::Compile => "compile",
            Self::Package => "package",
            Self::Metadata => "metadata",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipe lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    /// Lifecycle run started
    SessionStarted {
        session_id: String,
        package: PackageReference,
        package_id: String,
    },

    /// Lifecycle phase started
    PhaseStarted {
        session_id: String,
        phase: BuildPhase,
    },

    /// Lifecycle phase completed
    PhaseCompleted {
        session_id: String,
        phase: BuildPhase,
        duration: Duration,
    },

    /// External command spawned
    CommandStarted {
        session_id: String,
        command: String,
        working_dir: PathBuf,
    },

    /// External command exited
    CommandCompleted {
        session_id: String,
        command: String,
        exit_code: Option<i32>,
        duration: Duration,
    },

    /// Upstream tree materialized
    SourceFetched {
        session_id: String,
        url: String,
        path: PathBuf,
    },

    /// Text patch inserted after every anchor occurrence
    PatchApplied {
        session_id: String,
        file: PathBuf,
        anchor: String,
        occurrences: usize,
    },

    /// Dependency descriptor written into the build tree
    GeneratorWritten {
        session_id: String,
        path: PathBuf,
    },

    /// Two sources flattened onto the same destination; the later one won
    FileCollision {
        session_id: String,
        destination: PathBuf,
        replaced: PathBuf,
        winner: PathBuf,
    },

    /// Files copied into the package layout
    ArtifactsCollected {
        session_id: String,
        headers: usize,
        archives: usize,
    },

    /// Lifecycle finished successfully
    Completed {
        session_id: String,
        package: PackageReference,
        package_dir: PathBuf,
        duration: Duration,
    },

    /// Lifecycle aborted
    Failed {
        session_id: String,
        package: PackageReference,
        phase: Option<BuildPhase>,
        failure: FailureContext,
    },
}
