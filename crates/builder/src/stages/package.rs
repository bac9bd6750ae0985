//! Package stage and metadata export

use crate::core::context::BuildContext;
use crate::core::workspace::PackageLocation;
use crate::metadata::{package_info, write_package_info};
use crate::packaging::{package_layout, PackageRoots, PackagedFiles};
use crate::recipe::RecipeSpec;
use cpkg_errors::Error;
use cpkg_types::{MatrixPoint, PackageInfo};
use std::path::Path;

/// Collect headers and archives into the package layout
///
/// # Errors
///
/// Returns `BuildError::PackagingFailed` when a required rule selects
/// nothing or a packaged library is missing from `lib/`.
pub fn package(
    recipe: &RecipeSpec,
    source_dir: &Path,
    build_dir: &Path,
    location: &PackageLocation,
    ctx: &BuildContext,
) -> Result<PackagedFiles, Error> {
    let roots = PackageRoots {
        source: source_dir,
        build: build_dir,
    };
    package_layout(
        &recipe.package,
        roots,
        &location.package_dir(),
        &recipe.linkage,
        ctx,
    )
}

/// Publish the linkage metadata next to the layout
///
/// # Errors
///
/// Returns an error if the metadata file cannot be written.
pub fn export_metadata(
    recipe: &RecipeSpec,
    matrix: &MatrixPoint,
    location: &PackageLocation,
) -> Result<PackageInfo, Error> {
    let info = package_info(recipe, matrix);
    write_package_info(&location.metadata_path(), &info)?;
    Ok(info)
}
