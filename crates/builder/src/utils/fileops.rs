//! File system operations for build processes

use cpkg_errors::Error;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` through a temporary file in the same
/// directory, so readers never observe a partial write
///
/// Existing permissions of `path` are carried over.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io_with_path(&e, dir))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| Error::io_with_path(&e, tmp.path()))?;

    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| Error::io_with_path(&e, path))?;
    }

    tmp.persist(path)
        .map_err(|e| Error::io_with_path(&e.error, path))?;
    Ok(())
}

/// Remove `dir` and everything below it, then recreate it empty
pub fn reset_dir(dir: &Path) -> Result<(), Error> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io_with_path(&e, dir)),
    }
    std::fs::create_dir_all(dir).map_err(|e| Error::io_with_path(&e, dir))
}

/// Copy a single file, creating the destination's parent directories
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), Error> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;
    }
    std::fs::copy(src, dst).map_err(|e| Error::io_with_path(&e, src))?;
    Ok(())
}
