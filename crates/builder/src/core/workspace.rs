//! Directory layout of one invocation and of its published package

use cpkg_errors::Error;
use cpkg_types::PackageReference;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Per-invocation work directory holding the source and build trees
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parent of the cloned source tree
    #[must_use]
    pub fn source_root(&self) -> PathBuf {
        self.root.join("source")
    }

    /// Out-of-source build tree
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Create the source and build directories
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub async fn prepare(&self) -> Result<(), Error> {
        for dir in [self.source_root(), self.build_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| Error::io_with_path(&e, &dir))?;
        }
        Ok(())
    }
}

/// Location of one binary package in the cache
///
/// `<cache>/<name>/<version>/<package-id>/` holds the `package/` layout and
/// the `package_info.json` metadata next to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageLocation {
    root: PathBuf,
}

impl PackageLocation {
    #[must_use]
    pub fn new(cache_dir: &Path, reference: &PackageReference, package_id: &str) -> Self {
        Self {
            root: cache_dir
                .join(&reference.name)
                .join(&reference.version)
                .join(package_id),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Package layout (`include/`, `lib/`)
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        self.root.join("package")
    }

    /// Consumer metadata file
    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.root.join("package_info.json")
    }

    /// Open a staging directory next to this location
    ///
    /// Nothing appears at [`root`](Self::root) until the returned
    /// [`StagedPackage`] is committed. Dropping it uncommitted removes
    /// everything written so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the version directory or the staging directory
    /// cannot be created.
    pub fn stage(&self) -> Result<StagedPackage, Error> {
        let parent = self
            .root
            .parent()
            .ok_or_else(|| Error::internal(format!("{} has no parent", self.root.display())))?;
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;

        let dir = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(parent)
            .map_err(|e| Error::io_with_path(&e, parent))?;
        let staging = PackageLocation {
            root: dir.path().to_path_buf(),
        };

        Ok(StagedPackage {
            dir,
            staging,
            target: self.clone(),
        })
    }
}

/// A package being assembled outside the cache's visible paths
#[derive(Debug)]
pub struct StagedPackage {
    dir: TempDir,
    staging: PackageLocation,
    target: PackageLocation,
}

impl StagedPackage {
    /// Where the stages write the layout and metadata
    #[must_use]
    pub fn location(&self) -> &PackageLocation {
        &self.staging
    }

    /// Move the staged package to its final location
    ///
    /// A package already published at the target is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the previous package cannot be moved aside or the
    /// staged one cannot be renamed into place.
    pub fn commit(self) -> Result<PackageLocation, Error> {
        let target = self.target.root();
        let parent = self.dir.path().parent().unwrap_or(target);

        // Keep the replaced package until the new one is in place
        let previous = if target.exists() {
            let aside = tempfile::Builder::new()
                .prefix(".replaced-")
                .tempdir_in(parent)
                .map_err(|e| Error::io_with_path(&e, parent))?;
            let old = aside.path().join("package");
            std::fs::rename(target, &old).map_err(|e| Error::io_with_path(&e, target))?;
            Some((aside, old))
        } else {
            None
        };

        if let Err(e) = std::fs::rename(self.dir.path(), target) {
            if let Some((_, old)) = &previous {
                let _ = std::fs::rename(old, target);
            }
            return Err(Error::io_with_path(&e, target));
        }

        // `previous` and `self.dir` clean up on drop
        Ok(self.target)
    }
}
