//! Source stage: acquire the upstream tree and patch it

use crate::core::context::BuildContext;
use crate::core::workspace::Workspace;
use crate::fetch::{project_name, SourceFetcher};
use crate::patch::{apply_patch, PatchOutcome};
use crate::recipe::RecipeSpec;
use cpkg_errors::{BuildError, Error};
use cpkg_events::BuildEvent;
use std::path::PathBuf;

/// Clone the recipe's source into the workspace and apply every patch in
/// declaration order
///
/// Returns the root of the patched source tree.
///
/// # Errors
///
/// Returns `BuildError::AcquisitionFailed` (or whatever the fetcher
/// reports) if cloning fails, `BuildError::PatchAnchorNotFound` or
/// `BuildError::PatchAlreadyApplied` if a patch does not apply cleanly, and
/// I/O errors from reading or writing patched files.
pub async fn fetch_and_patch(
    fetcher: &dyn SourceFetcher,
    recipe: &RecipeSpec,
    workspace: &Workspace,
    ctx: &BuildContext,
) -> Result<PathBuf, Error> {
    let url = recipe.clone_url();
    let dest = workspace.source_root().join(project_name(&url)?);

    fetcher
        .fetch(&url, recipe.source.git_ref.as_deref(), &dest)
        .await?;

    ctx.emit_build(BuildEvent::SourceFetched {
        session_id: ctx.session_id.clone(),
        url: url.clone(),
        path: dest.clone(),
    });

    for patch in &recipe.patches {
        match apply_patch(&dest, patch)? {
            PatchOutcome::Patched { occurrences } => {
                ctx.emit_build(BuildEvent::PatchApplied {
                    session_id: ctx.session_id.clone(),
                    file: patch.file.clone(),
                    anchor: patch.anchor.clone(),
                    occurrences,
                });
            }
            PatchOutcome::AnchorNotFound => {
                return Err(BuildError::PatchAnchorNotFound {
                    file: patch.file.display().to_string(),
                    anchor: patch.anchor.clone(),
                }
                .into());
            }
            PatchOutcome::AlreadyApplied => {
                return Err(BuildError::PatchAlreadyApplied {
                    file: patch.file.display().to_string(),
                    anchor: patch.anchor.clone(),
                }
                .into());
            }
        }
    }

    Ok(dest)
}
