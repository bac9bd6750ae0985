//! cpkg - Recipe-driven C/C++ package builder
//!
//! Thin CLI over the builder crate: it loads configuration, resolves the
//! recipe and matrix point from arguments, runs the requested lifecycle
//! stages and renders the result.

mod cli;
mod display;
mod error;
mod logging;

use crate::cli::{Cli, Commands, CreateArgs, RecipeArgs};
use crate::display::{CommandResult, OutputRenderer, RecipeSummary};
use crate::error::CliError;
use crate::logging::log_event_with_tracing;
use clap::Parser;
use cpkg_builder::{
    builtin, parse_yaml_recipe, BuildConfig, BuildRequest, Builder, CMakeBuildSystem, GitFetcher,
    RecipeSpec, Workspace, BUILTIN_RECIPES,
};
use cpkg_config::{calculate_build_jobs, Config};
use cpkg_events::EventReceiver;
use cpkg_types::{Arch, Compiler, DependencyGraph, MatrixPoint, Os};
use std::future::Future;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        // One report per failure: a structured record in JSON mode, plain
        // text otherwise
        if json_mode {
            error!(error = %e, "Application error");
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting cpkg v{}", env!("CARGO_PKG_VERSION"));

    // File config (or defaults), then environment, then CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);

    let renderer = OutputRenderer::new(cli.global.json, config.general.color);

    let result = match cli.command {
        Commands::Inspect { recipe } => {
            let recipe = load_recipe(&recipe).await?;
            CommandResult::Inspect(RecipeSummary::from(&recipe))
        }
        Commands::Source { recipe, work_dir } => {
            let recipe = load_recipe(&recipe).await?;
            let workspace = Workspace::new(work_dir.unwrap_or_else(|| fresh_work_dir(&config)));
            let (builder, receiver) = builder(&config);
            let source_dir = with_events(receiver, builder.source(&recipe, &workspace)).await?;
            CommandResult::Source { source_dir }
        }
        Commands::Create(args) => {
            let request = build_request(&config, &args).await?;
            let (builder, receiver) = builder(&config);
            let report = with_events(receiver, builder.create(&request)).await?;
            CommandResult::Create(report)
        }
    };

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Builder wired to the real git and CMake tools, plus its event stream
fn builder(config: &Config) -> (Builder, EventReceiver) {
    let (event_sender, event_receiver) = cpkg_events::channel();

    let fetcher = GitFetcher::new()
        .with_program(&config.tools.git)
        .with_shallow(config.build.shallow_clone);
    let build_system = CMakeBuildSystem::new().with_program(&config.tools.cmake);
    let build_config = BuildConfig::default()
        .with_jobs(calculate_build_jobs(config.build.build_jobs))
        .with_keep_work_dir(config.build.keep_work_dir);

    let builder = Builder::new(Arc::new(fetcher), Arc::new(build_system))
        .with_config(build_config)
        .with_event_sender(event_sender);

    (builder, event_receiver)
}

/// Drive `operation` while logging every event it emits
async fn with_events<T, F>(mut event_receiver: EventReceiver, operation: F) -> Result<T, CliError>
where
    F: Future<Output = Result<T, cpkg_errors::Error>>,
{
    let mut operation = Box::pin(operation);

    loop {
        select! {
            result = &mut operation => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    log_event_with_tracing(&event);
                }
                return result.map_err(CliError::from);
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    log_event_with_tracing(&event);
                }
            }
        }
    }
}

async fn load_recipe(args: &RecipeArgs) -> Result<RecipeSpec, CliError> {
    if let Some(path) = &args.recipe {
        return Ok(parse_yaml_recipe(path).await?);
    }

    builtin(&args.name).ok_or_else(|| {
        CliError::InvalidArguments(format!(
            "unknown recipe '{}': expected one of {}",
            args.name,
            BUILTIN_RECIPES.join(", ")
        ))
    })
}

async fn build_request(config: &Config, args: &CreateArgs) -> Result<BuildRequest, CliError> {
    let recipe = load_recipe(&args.recipe).await?;

    let mut compiler = Compiler::new(args.compiler, &args.compiler_version);
    if let Some(libcxx) = &args.libcxx {
        compiler = compiler.with_libcxx(libcxx);
    }
    let matrix = MatrixPoint {
        os: args.os.unwrap_or_else(Os::host),
        arch: args.arch.unwrap_or_else(Arch::host),
        compiler,
        build_type: args.build_type,
    };

    let graph = match &args.deps {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| cpkg_errors::Error::io_with_path(&e, path))?;
            DependencyGraph::from_json(&content)?
        }
        None => DependencyGraph::default(),
    };

    let work_dir = args
        .work_dir
        .clone()
        .unwrap_or_else(|| fresh_work_dir(config));

    Ok(BuildRequest {
        recipe,
        matrix,
        graph,
        workspace: Workspace::new(work_dir),
        cache_dir: args.cache.clone().unwrap_or_else(|| config.cache_path()),
    })
}

/// Per-invocation directory below the configured work root
fn fresh_work_dir(config: &Config) -> PathBuf {
    config.work_path().join(uuid::Uuid::new_v4().to_string())
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let default_filter = if debug_enabled_flag {
        "info,cpkg=debug"
    } else {
        "warn,cpkg=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_mode {
        // JSON mode: logs go to stderr so stdout stays a single document
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(debug_enabled_flag)
            .with_env_filter(filter)
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, command: &Commands) {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    if let Commands::Create(args) = command {
        if let Some(jobs) = args.jobs {
            config.build.build_jobs = jobs;
        }
        if args.keep_work_dir {
            config.build.keep_work_dir = true;
        }
    }
}
