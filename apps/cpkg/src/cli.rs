//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use cpkg_types::{Arch, BuildType, ColorChoice, CompilerKind, Os};
use std::path::PathBuf;

/// cpkg - Recipe-driven C/C++ package builder
#[derive(Parser)]
#[command(name = "cpkg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recipe-driven C/C++ package builder")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Recipe selection shared by every command
#[derive(Args)]
pub struct RecipeArgs {
    /// Built-in recipe name
    #[arg(default_value = "httpmockserver")]
    pub name: String,

    /// Load the recipe from a YAML file instead
    #[arg(long, value_name = "PATH", conflicts_with = "name")]
    pub recipe: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show a recipe's identity, settings, requirements and options
    Inspect {
        #[command(flatten)]
        recipe: RecipeArgs,
    },

    /// Clone and patch the upstream sources without building
    Source {
        #[command(flatten)]
        recipe: RecipeArgs,

        /// Work directory to clone into (must not contain a previous checkout)
        #[arg(long, value_name = "DIR")]
        work_dir: Option<PathBuf>,
    },

    /// Build a package for one matrix point and publish it to the cache
    Create(CreateArgs),
}

/// Arguments of `cpkg create`
#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Target operating system (defaults to the host)
    #[arg(long, value_enum)]
    pub os: Option<Os>,

    /// Target architecture (defaults to the host)
    #[arg(long, value_enum)]
    pub arch: Option<Arch>,

    /// Compiler family
    #[arg(long, value_enum, default_value = "gcc")]
    pub compiler: CompilerKind,

    /// Compiler version
    #[arg(long, value_name = "VERSION")]
    pub compiler_version: String,

    /// C++ standard library flavour
    #[arg(long, value_name = "LIBCXX")]
    pub libcxx: Option<String>,

    /// CMake build configuration
    #[arg(long, value_enum, default_value_t = BuildType::Release)]
    pub build_type: BuildType,

    /// Resolved dependency graph (JSON array of resolved packages)
    #[arg(long, value_name = "PATH")]
    pub deps: Option<PathBuf>,

    /// Package cache directory
    #[arg(long, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// Work directory for the source and build trees
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Number of parallel build jobs (0=auto)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Keep the work directory after a successful build
    #[arg(long)]
    pub keep_work_dir: bool,
}
