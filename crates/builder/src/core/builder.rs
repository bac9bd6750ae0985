//! High-level lifecycle orchestration
//!
//! Source, Generate, Configure, Compile, Package and Metadata run strictly
//! in that order, once each. The first failure stops the run; nothing is
//! retried.

use super::config::BuildConfig;
use super::context::BuildContext;
use super::workspace::{PackageLocation, Workspace};
use crate::build_systems::{BuildSystem, BuildSystemContext};
use crate::fetch::SourceFetcher;
use crate::package_id::compute_package_id;
use crate::recipe::{validate_recipe, RecipeSpec};
use crate::stages;
use cpkg_errors::Error;
use cpkg_events::{BuildEvent, BuildPhase, EventSender, FailureContext};
use cpkg_types::{BuildReport, DependencyGraph, MatrixPoint};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Everything one `create` invocation needs from the host
#[derive(Clone, Debug)]
pub struct BuildRequest {
    pub recipe: RecipeSpec,
    pub matrix: MatrixPoint,
    /// Resolved graph covering at least the recipe's requirements
    pub graph: DependencyGraph,
    /// Fresh per-invocation work directory
    pub workspace: Workspace,
    /// Root of the package cache
    pub cache_dir: PathBuf,
}

/// Package builder
#[derive(Clone)]
pub struct Builder {
    /// Build configuration
    config: BuildConfig,
    fetcher: Arc<dyn SourceFetcher>,
    build_system: Arc<dyn BuildSystem>,
    event_sender: Option<EventSender>,
}

impl Builder {
    /// Create a builder over the given ports
    #[must_use]
    pub fn new(fetcher: Arc<dyn SourceFetcher>, build_system: Arc<dyn BuildSystem>) -> Self {
        Self {
            config: BuildConfig::default(),
            fetcher,
            build_system,
            event_sender: None,
        }
    }

    /// Set build configuration
    #[must_use]
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    fn context(&self, recipe: &RecipeSpec) -> BuildContext {
        BuildContext::new(recipe.reference())
            .with_optional_event_sender(self.event_sender.clone())
    }

    /// Run only the source stage
    ///
    /// Returns the patched source tree inside `workspace`.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe is invalid, cloning fails, or a patch
    /// does not apply.
    pub async fn source(&self, recipe: &RecipeSpec, workspace: &Workspace) -> Result<PathBuf, Error> {
        validate_recipe(recipe)?;
        let ctx = self.context(recipe);
        workspace.prepare().await?;

        run_phase(
            &ctx,
            BuildPhase::Source,
            stages::fetch_and_patch(self.fetcher.as_ref(), recipe, workspace, &ctx),
        )
        .await
    }

    /// Run the whole lifecycle and publish the package
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage. Dependency checks run
    /// before anything is fetched.
    pub async fn create(&self, request: &BuildRequest) -> Result<BuildReport, Error> {
        let started = Instant::now();
        let BuildRequest {
            recipe,
            matrix,
            graph,
            workspace,
            cache_dir,
        } = request;

        let ctx = self.context(recipe);
        if let Err(err) =
            validate_recipe(recipe).and_then(|()| stages::require_dependencies(recipe, graph))
        {
            emit_failed(&ctx, None, &err);
            return Err(err);
        }

        let package_id = compute_package_id(recipe, matrix);
        let location = PackageLocation::new(cache_dir, &ctx.reference, &package_id);

        ctx.emit_build(BuildEvent::SessionStarted {
            session_id: ctx.session_id.clone(),
            package: ctx.reference.clone(),
            package_id: package_id.clone(),
        });

        workspace.prepare().await?;
        let build_dir = workspace.build_dir();

        let source_dir = run_phase(
            &ctx,
            BuildPhase::Source,
            stages::fetch_and_patch(self.fetcher.as_ref(), recipe, workspace, &ctx),
        )
        .await?;

        run_phase(&ctx, BuildPhase::Generate, async {
            stages::generate(&build_dir, graph, &ctx)
        })
        .await?;

        let bctx = BuildSystemContext::new(ctx.clone(), source_dir.clone(), build_dir.clone())
            .with_build_type(matrix.build_type)
            .with_jobs(self.config.jobs);

        run_phase(
            &ctx,
            BuildPhase::Configure,
            stages::configure(self.build_system.as_ref(), &bctx, recipe, matrix),
        )
        .await?;

        run_phase(
            &ctx,
            BuildPhase::Compile,
            stages::compile(self.build_system.as_ref(), &bctx),
        )
        .await?;

        // Layout and metadata are published together or not at all
        let (staged, files) = run_phase(&ctx, BuildPhase::Package, async {
            let staged = location.stage()?;
            let files =
                stages::package(recipe, &source_dir, &build_dir, staged.location(), &ctx)?;
            Ok::<_, Error>((staged, files))
        })
        .await?;

        let info = run_phase(&ctx, BuildPhase::Metadata, async {
            let info = stages::export_metadata(recipe, matrix, staged.location())?;
            staged.commit()?;
            Ok::<_, Error>(info)
        })
        .await?;

        if !self.config.keep_work_dir {
            remove_work_dir(workspace.root(), &ctx).await;
        }

        let duration = started.elapsed();
        ctx.emit_build(BuildEvent::Completed {
            session_id: ctx.session_id.clone(),
            package: ctx.reference.clone(),
            package_dir: location.package_dir(),
            duration,
        });

        Ok(BuildReport {
            reference: info.reference,
            package_id: info.package_id,
            package_dir: location.package_dir(),
            metadata_path: location.metadata_path(),
            headers: files.headers,
            archives: files.archives,
            libs: info.libs,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

/// Await one lifecycle phase, reporting its start, completion or failure
async fn run_phase<T, F>(ctx: &BuildContext, phase: BuildPhase, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    ctx.phase_started(phase);
    let started = Instant::now();

    match fut.await {
        Ok(value) => {
            ctx.phase_completed(phase, started.elapsed());
            Ok(value)
        }
        Err(err) => {
            emit_failed(ctx, Some(phase), &err);
            Err(err)
        }
    }
}

fn emit_failed(ctx: &BuildContext, phase: Option<BuildPhase>, err: &Error) {
    ctx.emit_build(BuildEvent::Failed {
        session_id: ctx.session_id.clone(),
        package: ctx.reference.clone(),
        phase,
        failure: FailureContext::from_error(err),
    });
}

async fn remove_work_dir(root: &Path, ctx: &BuildContext) {
    use cpkg_events::EventEmitter;

    if let Err(e) = tokio::fs::remove_dir_all(root).await {
        ctx.emit_warning(format!(
            "could not remove work directory {}: {e}",
            root.display()
        ));
    }
}
