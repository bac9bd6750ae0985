//! Artifact collection into the normalized package layout
//!
//! Each [`CopyRule`] walks one tree and copies the files its glob selects.
//! Walks are depth-first with directory entries sorted by file name (byte
//! order), so when flattening makes two sources land on the same
//! destination the later one in that order wins, every time.

use crate::core::context::BuildContext;
use crate::utils::fileops::{copy_file, reset_dir};
use cpkg_errors::{BuildError, Error};
use cpkg_events::BuildEvent;
use cpkg_types::{archive_file_name, LinkageMetadata};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Tree a copy rule reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleRoot {
    Source,
    Build,
}

fn default_required() -> bool {
    true
}

/// Selects files from a tree and places them in the layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    /// Glob matched against the path relative to `src`
    pub pattern: String,
    pub root: RuleRoot,
    /// Subdirectory of the root to walk
    #[serde(default)]
    pub src: PathBuf,
    /// Destination directory inside the layout
    pub dst: PathBuf,
    /// Keep the relative directory structure instead of flattening
    #[serde(default)]
    pub keep_path: bool,
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Fail packaging when the rule copies nothing
    #[serde(default = "default_required")]
    pub required: bool,
}

impl CopyRule {
    pub fn new(pattern: impl Into<String>, root: RuleRoot, dst: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            root,
            src: PathBuf::new(),
            dst: dst.into(),
            keep_path: false,
            excludes: Vec::new(),
            required: true,
        }
    }

    #[must_use]
    pub fn from_dir(mut self, src: impl Into<PathBuf>) -> Self {
        self.src = src.into();
        self
    }

    #[must_use]
    pub fn keep_path(mut self, keep_path: bool) -> Self {
        self.keep_path = keep_path;
        self
    }

    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Check that `dst` stays inside `include/` or `lib/`
    ///
    /// # Errors
    ///
    /// Returns `BuildError::RecipeError` describing the offending rule.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |message: String| -> Error { BuildError::RecipeError { message }.into() };

        compile_globs(std::slice::from_ref(&self.pattern))?;
        compile_globs(&self.excludes)?;

        let mut components = self.dst.components();
        match components.next() {
            Some(Component::Normal(first)) if first == "include" || first == "lib" => {}
            _ => {
                return Err(invalid(format!(
                    "copy rule {} must target include/ or lib/, not {}",
                    self.pattern,
                    self.dst.display()
                )))
            }
        }
        if components.any(|c| !matches!(c, Component::Normal(_))) {
            return Err(invalid(format!(
                "copy rule {} has a non-normal destination {}",
                self.pattern,
                self.dst.display()
            )));
        }
        if self
            .src
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(invalid(format!(
                "copy rule {} reads outside its root: {}",
                self.pattern,
                self.src.display()
            )));
        }
        Ok(())
    }
}

/// Roots the copy rules resolve against
#[derive(Debug, Clone, Copy)]
pub struct PackageRoots<'a> {
    pub source: &'a Path,
    pub build: &'a Path,
}

impl PackageRoots<'_> {
    fn resolve(&self, rule: &CopyRule) -> PathBuf {
        match rule.root {
            RuleRoot::Source => self.source.join(&rule.src),
            RuleRoot::Build => self.build.join(&rule.src),
        }
    }
}

/// Files placed in the layout, relative to it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagedFiles {
    pub headers: Vec<PathBuf>,
    pub archives: Vec<PathBuf>,
}

fn compile_globs(patterns: &[String]) -> Result<GlobSet, Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| BuildError::RecipeError {
            message: format!("invalid glob {pattern}: {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| {
        BuildError::RecipeError {
            message: format!("invalid glob set: {e}"),
        }
        .into()
    })
}

/// Files under `root` matching the rule, in deterministic walk order
fn select_files(rule: &CopyRule, root: &Path) -> Result<Vec<(PathBuf, PathBuf)>, Error> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let includes = compile_globs(std::slice::from_ref(&rule.pattern))?;
    let excludes = compile_globs(&rule.excludes)?;

    let mut selected = Vec::new();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        let entry = entry.map_err(|e| Error::internal(format!("walking {}: {e}", root.display())))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.into_path();
        let Ok(relative) = path.strip_prefix(root).map(Path::to_path_buf) else {
            continue;
        };
        if includes.is_match(&relative) && !excludes.is_match(&relative) {
            selected.push((path, relative));
        }
    }

    Ok(selected)
}

/// Copy the files of one rule into `layout`
///
/// `placed` maps layout-relative destinations to the source that currently
/// occupies them; collisions are reported as events and the new file
/// overwrites the old one. Returns the destinations this rule wrote, in walk
/// order, without duplicates.
fn copy_rule(
    rule: &CopyRule,
    roots: PackageRoots<'_>,
    layout: &Path,
    placed: &mut HashMap<PathBuf, PathBuf>,
    ctx: &BuildContext,
) -> Result<Vec<PathBuf>, Error> {
    let root = roots.resolve(rule);
    let mut written: Vec<PathBuf> = Vec::new();

    for (source, relative) in select_files(rule, &root)? {
        let destination = if rule.keep_path {
            rule.dst.join(&relative)
        } else {
            match relative.file_name() {
                Some(name) => rule.dst.join(name),
                None => continue,
            }
        };

        if let Some(previous) = placed.insert(destination.clone(), source.clone()) {
            ctx.emit_build(BuildEvent::FileCollision {
                session_id: ctx.session_id.clone(),
                destination: destination.clone(),
                replaced: previous,
                winner: source.clone(),
            });
        }

        copy_file(&source, &layout.join(&destination))?;
        if !written.contains(&destination) {
            written.push(destination);
        }
    }

    Ok(written)
}

/// Check every packaged linkage entry against the archives in `lib/`
///
/// # Errors
///
/// Returns `BuildError::PackagingFailed` naming the first missing archive.
pub fn verify_linkage(layout: &Path, linkage: &LinkageMetadata) -> Result<(), Error> {
    for lib in linkage.packaged_libs() {
        let archive = Path::new("lib").join(archive_file_name(lib));
        if !layout.join(&archive).is_file() {
            return Err(BuildError::PackagingFailed {
                message: format!(
                    "linkage names {lib} but {} was not produced",
                    archive.display()
                ),
            }
            .into());
        }
    }
    Ok(())
}

/// Rebuild `layout` from the copy rules and verify it against `linkage`
///
/// The layout directory is emptied first, so only rule output remains.
///
/// # Errors
///
/// Returns `BuildError::PackagingFailed` when a required rule copies nothing
/// or a packaged library has no archive, and I/O errors from copying.
pub fn package_layout(
    rules: &[CopyRule],
    roots: PackageRoots<'_>,
    layout: &Path,
    linkage: &LinkageMetadata,
    ctx: &BuildContext,
) -> Result<PackagedFiles, Error> {
    reset_dir(layout)?;

    let mut placed = HashMap::new();
    let mut files = PackagedFiles::default();

    for rule in rules {
        let written = copy_rule(rule, roots, layout, &mut placed, ctx)?;
        if rule.required && written.is_empty() {
            return Err(BuildError::PackagingFailed {
                message: format!(
                    "no files matched {} under {}",
                    rule.pattern,
                    roots.resolve(rule).display()
                ),
            }
            .into());
        }

        for destination in written {
            let bucket = if destination.extension().is_some_and(|ext| ext == "a") {
                &mut files.archives
            } else {
                &mut files.headers
            };
            if !bucket.contains(&destination) {
                bucket.push(destination);
            }
        }
    }

    verify_linkage(layout, linkage)?;

    ctx.emit_build(BuildEvent::ArtifactsCollected {
        session_id: ctx.session_id.clone(),
        headers: files.headers.len(),
        archives: files.archives.len(),
    });

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpkg_events::{channel, AppEvent};
    use cpkg_types::PackageReference;
    use tempfile::tempdir;

    fn touch(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn ctx() -> BuildContext {
        BuildContext::new(PackageReference::new("httpmockserver", "0.1"))
    }

    #[test]
    fn later_file_wins_flatten_collision() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("source");
        let build = tmp.path().join("build");
        let layout = tmp.path().join("package");
        touch(&source.join("include/a/x.h"), "from a");
        touch(&source.join("include/b/x.h"), "from b");
        std::fs::create_dir_all(&build).unwrap();

        let (tx, mut rx) = channel();
        let ctx = ctx().with_event_sender(tx);
        let rules = [CopyRule::new("*.h", RuleRoot::Source, "include/httpmockserver")
            .from_dir("include")];
        let roots = PackageRoots {
            source: &source,
            build: &build,
        };

        let files =
            package_layout(&rules, roots, &layout, &LinkageMetadata::new(), &ctx).unwrap();

        assert_eq!(files.headers, [PathBuf::from("include/httpmockserver/x.h")]);
        assert_eq!(
            std::fs::read_to_string(layout.join("include/httpmockserver/x.h")).unwrap(),
            "from b"
        );

        let mut collisions = 0;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Build(BuildEvent::FileCollision {
                replaced, winner, ..
            }) = event
            {
                assert!(replaced.ends_with("a/x.h"));
                assert!(winner.ends_with("b/x.h"));
                collisions += 1;
            }
        }
        assert_eq!(collisions, 1);
    }

    #[test]
    fn excludes_and_keep_path() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("source");
        let layout = tmp.path().join("package");
        touch(&source.join("include/detail/impl.h"), "");
        touch(&source.join("include/api.h"), "");
        touch(&source.join("include/README.md"), "");

        let rules = [CopyRule::new("*.h", RuleRoot::Source, "include")
            .from_dir("include")
            .keep_path(true)
            .exclude("detail/**")];
        let roots = PackageRoots {
            source: &source,
            build: &source,
        };

        let files =
            package_layout(&rules, roots, &layout, &LinkageMetadata::new(), &ctx()).unwrap();
        assert_eq!(files.headers, [PathBuf::from("include/api.h")]);
        assert!(!layout.join("include/README.md").exists());
    }

    #[test]
    fn required_rule_without_matches_fails() {
        let tmp = tempdir().unwrap();
        let layout = tmp.path().join("package");
        let missing = tmp.path().join("missing");
        let rules = [CopyRule::new("*.a", RuleRoot::Build, "lib")];
        let roots = PackageRoots {
            source: tmp.path(),
            build: &missing,
        };

        let err = package_layout(&rules, roots, &layout, &LinkageMetadata::new(), &ctx())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Build(BuildError::PackagingFailed { .. })
        ));
    }

    #[test]
    fn linkage_requires_packaged_archive() {
        let tmp = tempdir().unwrap();
        let build = tmp.path().join("build");
        let layout = tmp.path().join("package");
        touch(&build.join("src/libother.a"), "!<arch>\n");

        let rules = [CopyRule::new("*.a", RuleRoot::Build, "lib")];
        let roots = PackageRoots {
            source: tmp.path(),
            build: &build,
        };
        let linkage = LinkageMetadata::new()
            .packaged("httpmockserver")
            .system("microhttpd");

        let err = package_layout(&rules, roots, &layout, &linkage, &ctx()).unwrap_err();
        assert!(err.to_string().contains("libhttpmockserver.a"));
    }

    #[test]
    fn layout_is_wiped_before_copy() {
        let tmp = tempdir().unwrap();
        let build = tmp.path().join("build");
        let layout = tmp.path().join("package");
        touch(&build.join("libhttpmockserver.a"), "!<arch>\n");
        touch(&layout.join("bin/stale"), "");

        let rules = [CopyRule::new("*.a", RuleRoot::Build, "lib")];
        let roots = PackageRoots {
            source: tmp.path(),
            build: &build,
        };
        package_layout(
            &rules,
            roots,
            &layout,
            &LinkageMetadata::new().packaged("httpmockserver"),
            &ctx(),
        )
        .unwrap();

        assert!(!layout.join("bin").exists());
        assert!(layout.join("lib/libhttpmockserver.a").is_file());
    }

    #[test]
    fn rule_validation() {
        assert!(CopyRule::new("*.h", RuleRoot::Source, "include/x")
            .validate()
            .is_ok());
        assert!(CopyRule::new("*.h", RuleRoot::Source, "share")
            .validate()
            .is_err());
        assert!(CopyRule::new("*.a", RuleRoot::Build, "lib/../bin")
            .validate()
            .is_err());
        assert!(CopyRule::new("*.a", RuleRoot::Build, "lib")
            .from_dir("../elsewhere")
            .validate()
            .is_err());
        assert!(CopyRule::new("[", RuleRoot::Build, "lib").validate().is_err());
    }
}
