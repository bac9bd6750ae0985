//! Integration tests for the recipe lifecycle

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use cpkg_builder::*;
    use cpkg_errors::{BuildError, Error};
    use cpkg_events::{channel, AppEvent, BuildEvent, BuildPhase};
    use cpkg_types::{
        Arch, BuildType, Compiler, CompilerKind, DependencyGraph, MatrixPoint, Os,
    };
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    const ROOT_CMAKE: &str = "cmake_minimum_required(VERSION 3.10)\n\
project(httpmockserver LANGUAGES CXX)\n\
add_subdirectory(src)\n";

    const SRC_CMAKE: &str = "add_library(httpmockserver STATIC mock_server.cc)\n\
install(TARGETS httpmockserver ARCHIVE DESTINATION lib)\n";

    /// Writes a small httpmockserver checkout instead of cloning
    struct FakeFetcher {
        root_cmake: String,
        src_cmake: String,
        unreachable: bool,
    }

    impl FakeFetcher {
        fn upstream() -> Self {
            Self {
                root_cmake: ROOT_CMAKE.to_string(),
                src_cmake: SRC_CMAKE.to_string(),
                unreachable: false,
            }
        }
    }

    #[async_trait]
    impl SourceFetcher for FakeFetcher {
        async fn fetch(&self, url: &str, _git_ref: Option<&str>, dest: &Path) -> Result<(), Error> {
            if self.unreachable {
                return Err(BuildError::AcquisitionFailed {
                    url: url.to_string(),
                    message: "fatal: unable to access repository".into(),
                }
                .into());
            }
            let files = [
                ("CMakeLists.txt", self.root_cmake.as_str()),
                ("src/CMakeLists.txt", self.src_cmake.as_str()),
                ("src/mock_server.cc", "// impl\n"),
                ("include/httpmockserver/mock_server.h", "#pragma once\n"),
                ("include/httpmockserver/mock_holder.h", "#pragma once\n"),
                ("include/httpmockserver/port_searcher.h", "#pragma once\n"),
                ("include/httpmockserver/test_environment.h", "#pragma once\n"),
                ("test/test_helper.h", "#pragma once\n"),
                ("README.md", "# httpmockserver\n"),
            ];
            for (relative, contents) in files {
                let path = dest.join(relative);
                std::fs::create_dir_all(path.parent().unwrap())?;
                std::fs::write(path, contents)?;
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeBuildSystem {
        fail_configure: bool,
        fail_compile: bool,
        /// Compile succeeds without producing the static archive
        no_archive: bool,
        calls: Mutex<Vec<String>>,
        definitions: Mutex<Option<Definitions>>,
    }

    #[async_trait]
    impl BuildSystem for FakeBuildSystem {
        async fn configure(
            &self,
            ctx: &BuildSystemContext,
            definitions: &Definitions,
        ) -> Result<(), Error> {
            self.calls.lock().unwrap().push("configure".into());
            *self.definitions.lock().unwrap() = Some(definitions.clone());

            assert!(ctx.build_dir.join(BUILD_INFO_FILE).is_file());
            let patched = std::fs::read_to_string(ctx.source_dir.join("CMakeLists.txt"))?;
            assert!(patched.contains("cpkg_basic_setup()"));

            if self.fail_configure {
                return Err(BuildError::ConfigureFailed {
                    status: Some(1),
                    output: "CMake Error: Could not find cpr\n".into(),
                }
                .into());
            }
            Ok(())
        }

        async fn build(&self, ctx: &BuildSystemContext) -> Result<(), Error> {
            self.calls.lock().unwrap().push("build".into());
            if self.fail_compile {
                return Err(BuildError::CompileFailed {
                    status: Some(2),
                    output: "mock_server.cc:12:5: error: 'MHD_Daemon' was not declared\n".into(),
                }
                .into());
            }
            let objects = ctx.build_dir.join("src/CMakeFiles/httpmockserver.dir");
            std::fs::create_dir_all(&objects)?;
            std::fs::write(objects.join("mock_server.cc.o"), "obj")?;
            if !self.no_archive {
                std::fs::write(ctx.build_dir.join("src/libhttpmockserver.a"), "!<arch>\n")?;
            }
            Ok(())
        }
    }

    fn matrix() -> MatrixPoint {
        MatrixPoint {
            os: Os::Linux,
            arch: Arch::X86_64,
            compiler: Compiler::new(CompilerKind::Gcc, "9").with_libcxx("libstdc++11"),
            build_type: BuildType::Release,
        }
    }

    fn graph() -> DependencyGraph {
        DependencyGraph::from_json(
            r#"[
                {"reference": "cpr/1.5.0", "root": "/cache/cpr/1.5.0/p", "libs": ["cpr"], "system_libs": ["curl"]},
                {"reference": "gtest/1.10.0", "root": "/cache/gtest/1.10.0/p", "libs": ["gtest"]}
            ]"#,
        )
        .unwrap()
    }

    fn request(root: &Path) -> BuildRequest {
        BuildRequest {
            recipe: builtin("httpmockserver").unwrap(),
            matrix: matrix(),
            graph: graph(),
            workspace: Workspace::new(root.join("work")),
            cache_dir: root.join("cache"),
        }
    }

    fn files_under(root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    files.push(path.strip_prefix(root).unwrap().to_path_buf());
                }
            }
        }
        files.sort();
        files
    }

    #[tokio::test]
    async fn test_create_produces_layout_and_metadata() {
        let tmp = tempdir().unwrap();
        let build_system = Arc::new(FakeBuildSystem::default());
        let builder = Builder::new(Arc::new(FakeFetcher::upstream()), build_system.clone());

        let report = builder.create(&request(tmp.path())).await.unwrap();

        let files = files_under(&report.package_dir);
        assert!(files.contains(&PathBuf::from("include/httpmockserver/mock_server.h")));
        assert!(files.contains(&PathBuf::from("lib/libhttpmockserver.a")));
        assert!(files
            .iter()
            .all(|f| f.starts_with("include") || f.starts_with("lib")));
        assert!(!files.iter().any(|f| f.ends_with("test_helper.h")));
        assert_eq!(report.headers.len(), 4);
        assert_eq!(report.archives, [PathBuf::from("lib/libhttpmockserver.a")]);

        assert_eq!(report.libs, ["httpmockserver", "microhttpd"]);
        let info = read_package_info(&report.metadata_path).unwrap();
        assert_eq!(info.libs, ["httpmockserver", "microhttpd"]);
        assert_eq!(
            report.archives[0].file_name().unwrap(),
            format!("lib{}.a", info.libs[0]).as_str()
        );
        assert!(!report.metadata_path.starts_with(&report.package_dir));

        let definitions = build_system.definitions.lock().unwrap().clone().unwrap();
        assert_eq!(definitions["USE_SYSTEM_CURL"], "ON");
        assert_eq!(definitions["BUILD_CPR_TESTS"], "OFF");
        assert_eq!(definitions["CPKG_LIBCXX"], "libstdc++11");
        assert_eq!(*build_system.calls.lock().unwrap(), ["configure", "build"]);

        // Work directory is removed by default
        assert!(!tmp.path().join("work").exists());
    }

    #[tokio::test]
    async fn test_package_dir_is_keyed_by_package_id() {
        let tmp = tempdir().unwrap();
        let builder = Builder::new(
            Arc::new(FakeFetcher::upstream()),
            Arc::new(FakeBuildSystem::default()),
        );
        let request = request(tmp.path());

        let report = builder.create(&request).await.unwrap();

        assert_eq!(
            report.package_id,
            compute_package_id(&request.recipe, &request.matrix)
        );
        assert_eq!(
            report.package_dir,
            tmp.path()
                .join("cache/httpmockserver/0.1")
                .join(&report.package_id)
                .join("package")
        );
    }

    #[tokio::test]
    async fn test_phases_run_in_order() {
        let tmp = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let builder = Builder::new(
            Arc::new(FakeFetcher::upstream()),
            Arc::new(FakeBuildSystem::default()),
        )
        .with_event_sender(tx);

        builder.create(&request(tmp.path())).await.unwrap();

        let mut started = Vec::new();
        let mut patches = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Build(BuildEvent::PhaseStarted { phase, .. }) => started.push(phase),
                AppEvent::Build(BuildEvent::PatchApplied { occurrences, .. }) => {
                    assert_eq!(occurrences, 1);
                    patches += 1;
                }
                _ => {}
            }
        }
        assert_eq!(
            started,
            [
                BuildPhase::Source,
                BuildPhase::Generate,
                BuildPhase::Configure,
                BuildPhase::Compile,
                BuildPhase::Package,
                BuildPhase::Metadata
            ]
        );
        assert_eq!(patches, 2);
    }

    #[tokio::test]
    async fn test_configure_failure_stops_before_compile() {
        let tmp = tempdir().unwrap();
        let build_system = Arc::new(FakeBuildSystem {
            fail_configure: true,
            ..FakeBuildSystem::default()
        });
        let builder = Builder::new(Arc::new(FakeFetcher::upstream()), build_system.clone());

        let err = builder.create(&request(tmp.path())).await.unwrap_err();

        match err {
            Error::Build(BuildError::ConfigureFailed { status, output }) => {
                assert_eq!(status, Some(1));
                assert_eq!(output, "CMake Error: Could not find cpr\n");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*build_system.calls.lock().unwrap(), ["configure"]);
        assert!(!tmp.path().join("cache").exists());
    }

    #[tokio::test]
    async fn test_missing_anchor_aborts_source_stage() {
        let tmp = tempdir().unwrap();
        let build_system = Arc::new(FakeBuildSystem::default());
        let fetcher = FakeFetcher {
            root_cmake: "project(httpmockserver)\n".to_string(),
            ..FakeFetcher::upstream()
        };
        let builder = Builder::new(Arc::new(fetcher), build_system.clone())
            .with_config(BuildConfig::default().with_keep_work_dir(true));

        let err = builder.create(&request(tmp.path())).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Build(BuildError::PatchAnchorNotFound { .. })
        ));
        assert_eq!(err.stage(), Some("source"));
        assert!(build_system.calls.lock().unwrap().is_empty());
        let untouched = std::fs::read_to_string(
            tmp.path()
                .join("work/source/httpmockserver/CMakeLists.txt"),
        )
        .unwrap();
        assert_eq!(untouched, "project(httpmockserver)\n");
    }

    #[tokio::test]
    async fn test_missing_dependency_fails_before_source() {
        let tmp = tempdir().unwrap();
        let build_system = Arc::new(FakeBuildSystem::default());
        let builder = Builder::new(Arc::new(FakeFetcher::upstream()), build_system.clone());

        let mut request = request(tmp.path());
        request.graph = DependencyGraph::from_json(
            r#"[{"reference": "cpr/1.5.0", "root": "/cache/cpr"}]"#,
        )
        .unwrap();

        let err = builder.create(&request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Build(BuildError::MissingDependency { ref name }) if name == "gtest/1.10.0"
        ));
        assert!(!tmp.path().join("work").exists());
    }

    #[tokio::test]
    async fn test_source_stage_is_reproducible() {
        let tmp = tempdir().unwrap();
        let builder = Builder::new(
            Arc::new(FakeFetcher::upstream()),
            Arc::new(FakeBuildSystem::default()),
        );
        let recipe = builtin("httpmockserver").unwrap();

        let first = builder
            .source(&recipe, &Workspace::new(tmp.path().join("one")))
            .await
            .unwrap();
        let second = builder
            .source(&recipe, &Workspace::new(tmp.path().join("two")))
            .await
            .unwrap();

        for file in ["CMakeLists.txt", "src/CMakeLists.txt"] {
            assert_eq!(
                std::fs::read(first.join(file)).unwrap(),
                std::fs::read(second.join(file)).unwrap()
            );
        }
        let root = std::fs::read_to_string(first.join("CMakeLists.txt")).unwrap();
        assert_eq!(
            root,
            "cmake_minimum_required(VERSION 3.10)\n\
project(httpmockserver LANGUAGES CXX)\n\
include(${CMAKE_BINARY_DIR}/cpkgbuildinfo.cmake)\n\
cpkg_basic_setup()\n\
add_subdirectory(src)\n"
        );
    }

    #[tokio::test]
    async fn test_patching_a_patched_tree_fails() {
        let tmp = tempdir().unwrap();
        let recipe = builtin("httpmockserver").unwrap();
        let workspace = Workspace::new(tmp.path().join("work"));
        let builder = Builder::new(
            Arc::new(FakeFetcher::upstream()),
            Arc::new(FakeBuildSystem::default()),
        );

        let source_dir = builder.source(&recipe, &workspace).await.unwrap();

        let outcome = apply_patch(&source_dir, &recipe.patches[0]).unwrap();
        assert_eq!(outcome, PatchOutcome::AlreadyApplied);
    }

    #[tokio::test]
    async fn test_acquisition_failure_stops_before_patching() {
        let tmp = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let build_system = Arc::new(FakeBuildSystem::default());
        let fetcher = FakeFetcher {
            unreachable: true,
            ..FakeFetcher::upstream()
        };
        let builder = Builder::new(Arc::new(fetcher), build_system.clone())
            .with_config(BuildConfig::default().with_keep_work_dir(true))
            .with_event_sender(tx);

        let err = builder.create(&request(tmp.path())).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Build(BuildError::AcquisitionFailed { .. })
        ));
        assert_eq!(err.stage(), Some("source"));
        assert!(build_system.calls.lock().unwrap().is_empty());
        assert!(!tmp.path().join("cache").exists());

        let mut failed_phase = None;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Build(BuildEvent::PatchApplied { .. }) => {
                    panic!("patch applied after a failed clone")
                }
                AppEvent::Build(BuildEvent::PhaseStarted { phase, .. }) => {
                    assert_eq!(phase, BuildPhase::Source);
                }
                AppEvent::Build(BuildEvent::Failed { phase, .. }) => failed_phase = phase,
                _ => {}
            }
        }
        assert_eq!(failed_phase, Some(BuildPhase::Source));
    }

    #[tokio::test]
    async fn test_compile_failure_keeps_tool_output() {
        let tmp = tempdir().unwrap();
        let build_system = Arc::new(FakeBuildSystem {
            fail_compile: true,
            ..FakeBuildSystem::default()
        });
        let builder = Builder::new(Arc::new(FakeFetcher::upstream()), build_system.clone());

        let err = builder.create(&request(tmp.path())).await.unwrap_err();

        assert_eq!(err.stage(), Some("compile"));
        match err {
            Error::Build(BuildError::CompileFailed { status, output }) => {
                assert_eq!(status, Some(2));
                assert_eq!(
                    output,
                    "mock_server.cc:12:5: error: 'MHD_Daemon' was not declared\n"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*build_system.calls.lock().unwrap(), ["configure", "build"]);
        assert!(!tmp.path().join("cache").exists());
    }

    #[tokio::test]
    async fn test_packaging_failure_publishes_nothing() {
        let tmp = tempdir().unwrap();
        let build_system = Arc::new(FakeBuildSystem {
            no_archive: true,
            ..FakeBuildSystem::default()
        });
        let builder = Builder::new(Arc::new(FakeFetcher::upstream()), build_system);
        let request = request(tmp.path());

        let err = builder.create(&request).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Build(BuildError::PackagingFailed { .. })
        ));
        assert_eq!(err.stage(), Some("package"));

        // Headers were copied before the archive rule failed; none may remain
        let package_id = compute_package_id(&request.recipe, &request.matrix);
        let version_dir = tmp.path().join("cache/httpmockserver/0.1");
        assert!(!version_dir.join(&package_id).exists());
        if version_dir.exists() {
            assert_eq!(std::fs::read_dir(&version_dir).unwrap().count(), 0);
        }
    }

    #[tokio::test]
    async fn test_rebuild_replaces_published_package() {
        let tmp = tempdir().unwrap();
        let builder = Builder::new(
            Arc::new(FakeFetcher::upstream()),
            Arc::new(FakeBuildSystem::default()),
        );
        let request = request(tmp.path());

        let first = builder.create(&request).await.unwrap();
        std::fs::write(first.package_dir.join("stale.txt"), "left over").unwrap();

        let second = builder.create(&request).await.unwrap();

        assert_eq!(first.package_dir, second.package_dir);
        assert!(!second.package_dir.join("stale.txt").exists());
        assert!(second.package_dir.join("lib/libhttpmockserver.a").is_file());
        assert!(second.metadata_path.is_file());
        let version_dir = second.package_dir.parent().unwrap().parent().unwrap();
        assert_eq!(std::fs::read_dir(version_dir).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_missing_install_anchor_aborts_source_stage() {
        let tmp = tempdir().unwrap();
        let build_system = Arc::new(FakeBuildSystem::default());
        let renamed_rule = "install(TARGETS httpmockserver DESTINATION lib)\n";
        let fetcher = FakeFetcher {
            src_cmake: format!("add_library(httpmockserver STATIC mock_server.cc)\n{renamed_rule}"),
            ..FakeFetcher::upstream()
        };
        let builder = Builder::new(Arc::new(fetcher), build_system.clone())
            .with_config(BuildConfig::default().with_keep_work_dir(true));

        let err = builder.create(&request(tmp.path())).await.unwrap_err();

        match &err {
            Error::Build(BuildError::PatchAnchorNotFound { file, anchor }) => {
                assert_eq!(file, "src/CMakeLists.txt");
                assert_eq!(
                    anchor,
                    "install(TARGETS httpmockserver ARCHIVE DESTINATION lib)"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.stage(), Some("source"));
        assert!(build_system.calls.lock().unwrap().is_empty());

        let source = tmp.path().join("work/source/httpmockserver");
        assert!(std::fs::read_to_string(source.join("src/CMakeLists.txt"))
            .unwrap()
            .ends_with(renamed_rule));
        // Patch 1 ran before patch 2 failed
        assert!(std::fs::read_to_string(source.join("CMakeLists.txt"))
            .unwrap()
            .contains("cpkg_basic_setup()"));
    }
}
