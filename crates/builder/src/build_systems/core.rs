//! Core types and utilities for build systems

use crate::core::context::BuildContext;
use cpkg_errors::{BuildError, Error};
use cpkg_events::BuildEvent;
use cpkg_types::BuildType;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of running one external command
#[derive(Debug, Clone)]
pub struct BuildCommandResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl BuildCommandResult {
    /// stdout followed by stderr, unmodified
    #[must_use]
    pub fn combined_output(&self) -> String {
        let mut output = String::with_capacity(self.stdout.len() + self.stderr.len());
        output.push_str(&self.stdout);
        output.push_str(&self.stderr);
        output
    }
}

/// Build system context containing all necessary information for building
#[derive(Clone, Debug)]
pub struct BuildSystemContext {
    /// Patched source tree
    pub source_dir: PathBuf,
    /// Out-of-source build directory
    pub build_dir: PathBuf,
    /// Configuration passed to multi-config generators
    pub build_type: BuildType,
    /// Number of parallel jobs
    pub jobs: usize,
    /// Lifecycle run the commands belong to
    pub build: BuildContext,
}

impl BuildSystemContext {
    /// Create a new build context
    pub fn new(build: BuildContext, source_dir: PathBuf, build_dir: PathBuf) -> Self {
        Self {
            source_dir,
            build_dir,
            build_type: BuildType::default(),
            jobs: 1,
            build,
        }
    }

    #[must_use]
    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Execute a command and capture its output
    ///
    /// A non-zero exit status is not an error here; callers decide which
    /// error it maps to.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ToolNotFound` for `stage` if the program cannot
    /// be located, or an I/O error if it cannot be spawned.
    pub async fn execute(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
        stage: &'static str,
    ) -> Result<BuildCommandResult, Error> {
        let resolved = which::which(program).map_err(|_| BuildError::ToolNotFound {
            tool: program.to_string(),
            stage,
        })?;
        let command_line = format!("{program} {}", args.join(" "));

        self.build.emit_build(BuildEvent::CommandStarted {
            session_id: self.build.session_id.clone(),
            command: command_line.clone(),
            working_dir: working_dir.to_path_buf(),
        });

        let started = Instant::now();
        let output = tokio::process::Command::new(resolved)
            .args(args)
            .current_dir(working_dir)
            .output()
            .await
            .map_err(|e| Error::io_with_path(&e, working_dir))?;

        let result = BuildCommandResult {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        self.build.emit_build(BuildEvent::CommandCompleted {
            session_id: self.build.session_id.clone(),
            command: command_line,
            exit_code: result.exit_code,
            duration: started.elapsed(),
        });

        Ok(result)
    }
}
