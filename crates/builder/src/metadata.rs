//! Consumer metadata exported next to the package layout

use crate::package_id::compute_package_id;
use crate::recipe::RecipeSpec;
use crate::utils::fileops::write_atomic;
use cpkg_errors::Error;
use cpkg_types::{MatrixPoint, PackageInfo};
use std::path::{Path, PathBuf};

/// Describe the binary built from `recipe` at `matrix`
#[must_use]
pub fn package_info(recipe: &RecipeSpec, matrix: &MatrixPoint) -> PackageInfo {
    PackageInfo {
        reference: recipe.reference(),
        package_id: compute_package_id(recipe, matrix),
        settings: matrix.values_for(&recipe.settings).into_iter().collect(),
        options: recipe.options.clone(),
        requires: recipe.requires.clone(),
        libs: recipe.linkage.names(),
        system_libs: recipe.linkage.system_libs().map(str::to_string).collect(),
        include_dirs: vec![PathBuf::from("include")],
        lib_dirs: vec![PathBuf::from("lib")],
    }
}

/// Write `info` as pretty JSON to `path`
///
/// # Errors
///
/// Returns an error if serialization or the atomic write fails.
pub fn write_package_info(path: &Path, info: &PackageInfo) -> Result<(), Error> {
    let mut json = serde_json::to_vec_pretty(info)?;
    json.push(b'\n');
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;
    }
    write_atomic(path, &json)
}

/// Read back a metadata file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid metadata.
pub fn read_package_info(path: &Path) -> Result<PackageInfo, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(&e, path))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::httpmockserver;
    use cpkg_types::{Arch, BuildType, Compiler, CompilerKind, Os};
    use tempfile::tempdir;

    #[test]
    fn metadata_lists_packaged_then_system_libs() {
        let matrix = MatrixPoint {
            os: Os::Linux,
            arch: Arch::Armv8,
            compiler: Compiler::new(CompilerKind::Clang, "10").with_libcxx("libc++"),
            build_type: BuildType::Release,
        };
        let info = package_info(&httpmockserver::recipe(), &matrix);

        assert_eq!(info.libs, ["httpmockserver", "microhttpd"]);
        assert_eq!(info.system_libs, ["microhttpd"]);
        assert_eq!(info.settings["arch"], "armv8");
        assert_eq!(info.settings["compiler.libcxx"], "libc++");

        let dir = tempdir().unwrap();
        let path = dir.path().join("package_info.json");
        write_package_info(&path, &info).unwrap();
        assert_eq!(read_package_info(&path).unwrap(), info);
    }
}
