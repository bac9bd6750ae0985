#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for cpkg
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/cpkg/config.toml)
//! - Environment variables
//! - CLI flags

pub mod core;

pub use core::{GeneralConfig, PathConfig, ToolConfig};

use cpkg_errors::{ConfigError, Error};
use cpkg_types::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub tools: ToolConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_build_jobs")]
    pub build_jobs: usize, // 0 = auto-detect
    /// Keep the work directory after a successful build
    #[serde(default)]
    pub keep_work_dir: bool,
    /// Clone with `--depth 1`
    #[serde(default = "default_shallow_clone")]
    pub shallow_clone: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            build_jobs: 0,
            keep_work_dir: false,
            shallow_clone: true,
        }
    }
}

fn default_build_jobs() -> usize {
    0 // 0 = auto-detect
}

fn default_shallow_clone() -> bool {
    true
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("cpkg").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        tracing::debug!(path = %path.display(), "loading configuration");

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // CPKG_OUTPUT
        if let Ok(output) = std::env::var("CPKG_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "CPKG_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // CPKG_BUILD_JOBS
        if let Ok(jobs) = std::env::var("CPKG_BUILD_JOBS") {
            self.build.build_jobs = jobs.parse().map_err(|_| ConfigError::InvalidValue {
                field: "CPKG_BUILD_JOBS".to_string(),
                value: jobs,
            })?;
        }

        // CPKG_GIT / CPKG_CMAKE
        if let Ok(git) = std::env::var("CPKG_GIT") {
            if git.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "CPKG_GIT".to_string(),
                    value: git,
                }
                .into());
            }
            self.tools.git = git;
        }
        if let Ok(cmake) = std::env::var("CPKG_CMAKE") {
            if cmake.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "CPKG_CMAKE".to_string(),
                    value: cmake,
                }
                .into());
            }
            self.tools.cmake = cmake;
        }

        // CPKG_CACHE_DIR / CPKG_WORK_DIR
        if let Some(dir) = std::env::var_os("CPKG_CACHE_DIR") {
            self.paths.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = std::env::var_os("CPKG_WORK_DIR") {
            self.paths.work_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Get the package cache path (with default)
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.paths
            .cache_dir
            .clone()
            .unwrap_or_else(|| base_dir().join("packages"))
    }

    /// Get the work directory root (with default)
    #[must_use]
    pub fn work_path(&self) -> PathBuf {
        self.paths
            .work_dir
            .clone()
            .unwrap_or_else(|| base_dir().join("work"))
    }
}

fn base_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cpkg")
}

/// Calculate build jobs based on CPU count
#[must_use]
pub fn calculate_build_jobs(config_value: usize) -> usize {
    if config_value > 0 {
        config_value // User override
    } else {
        // Use 75% of CPUs for builds, minimum 1
        let cpus = num_cpus::get();
        (cpus * 3 / 4).max(1)
    }
}
