//! Configuration sections shared by every command

use cpkg_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

/// Path configuration
///
/// Unset paths fall back to locations under the user cache directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Root of the package cache that receives finished layouts
    pub cache_dir: Option<PathBuf>,
    /// Root under which per-invocation work directories are created
    pub work_dir: Option<PathBuf>,
}

/// External tools the builder shells out to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_git")]
    pub git: String,
    #[serde(default = "default_cmake")]
    pub cmake: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            git: default_git(),
            cmake: default_cmake(),
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_git() -> String {
    "git".to_string()
}

fn default_cmake() -> String {
    "cmake".to_string()
}
