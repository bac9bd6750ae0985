//! Source acquisition port and its git implementation

use async_trait::async_trait;
use cpkg_errors::{BuildError, Error};
use std::path::Path;

/// Materializes an upstream tree at a destination directory
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Clone `url` into `dest`, at `git_ref` when given or the default ref
    /// otherwise
    ///
    /// `dest` must not exist yet; its parent does.
    async fn fetch(&self, url: &str, git_ref: Option<&str>, dest: &Path) -> Result<(), Error>;
}

/// Last path segment of a repository URL without a trailing `.git`
///
/// # Errors
///
/// Returns `BuildError::InvalidUrl` when no usable segment exists.
pub fn project_name(url: &str) -> Result<&str, Error> {
    url.trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .map(|segment| segment.strip_suffix(".git").unwrap_or(segment))
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .ok_or_else(|| {
            BuildError::InvalidUrl {
                url: url.to_string(),
            }
            .into()
        })
}

/// Clones with the `git` command line tool
#[derive(Clone, Debug)]
pub struct GitFetcher {
    program: String,
    shallow: bool,
}

impl GitFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
            shallow: true,
        }
    }

    /// Use a different git executable
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Toggle `--depth 1`
    #[must_use]
    pub fn with_shallow(mut self, shallow: bool) -> Self {
        self.shallow = shallow;
        self
    }

    fn clone_args(&self, url: &str, git_ref: Option<&str>, dest: &Path) -> Vec<String> {
        let mut args = vec!["clone".to_string()];
        if self.shallow {
            args.push("--depth".to_string());
            args.push("1".to_string());
        }
        if let Some(git_ref) = git_ref {
            args.push("--branch".to_string());
            args.push(git_ref.to_string());
        }
        args.push(url.to_string());
        args.push(dest.display().to_string());
        args
    }
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceFetcher for GitFetcher {
    async fn fetch(&self, url: &str, git_ref: Option<&str>, dest: &Path) -> Result<(), Error> {
        let git = which::which(&self.program).map_err(|_| BuildError::ToolNotFound {
            tool: self.program.clone(),
            stage: "source",
        })?;

        let args = self.clone_args(url, git_ref, dest);
        let output = tokio::process::Command::new(git)
            .args(&args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|e| BuildError::AcquisitionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(BuildError::AcquisitionFailed {
                url: url.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(())
    }
}
