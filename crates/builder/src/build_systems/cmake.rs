//! CMake build system implementation

use super::{BuildSystem, BuildSystemContext, Definitions};
use async_trait::async_trait;
use cpkg_errors::{BuildError, Error};
use tokio::fs;

/// CMake build system
#[derive(Clone, Debug)]
pub struct CMakeBuildSystem {
    program: String,
}

impl CMakeBuildSystem {
    /// Create a new CMake build system instance
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "cmake".to_string(),
        }
    }

    /// Use a different cmake executable
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Get CMake configuration arguments
    fn configure_args(ctx: &BuildSystemContext, definitions: &Definitions) -> Vec<String> {
        let mut args = Vec::with_capacity(definitions.len() + 1);

        // Always specify source directory
        args.push(ctx.source_dir.display().to_string());
        args.extend(
            definitions
                .iter()
                .map(|(name, value)| format!("-D{name}={value}")),
        );

        args
    }

    fn build_args(ctx: &BuildSystemContext) -> Vec<String> {
        let mut args = vec![
            "--build".to_string(),
            ".".to_string(),
            "--config".to_string(),
            ctx.build_type.as_str().to_string(),
        ];

        // Add parallel jobs
        if ctx.jobs > 1 {
            args.push("--parallel".to_string());
            args.push(ctx.jobs.to_string());
        }

        args
    }
}

impl Default for CMakeBuildSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildSystem for CMakeBuildSystem {
    async fn configure(
        &self,
        ctx: &BuildSystemContext,
        definitions: &Definitions,
    ) -> Result<(), Error> {
        fs::create_dir_all(&ctx.build_dir)
            .await
            .map_err(|e| Error::io_with_path(&e, &ctx.build_dir))?;

        let args = Self::configure_args(ctx, definitions);
        let result = ctx
            .execute(&self.program, &args, &ctx.build_dir, "configure")
            .await?;

        if !result.success {
            return Err(BuildError::ConfigureFailed {
                status: result.exit_code,
                output: result.combined_output(),
            }
            .into());
        }

        Ok(())
    }

    async fn build(&self, ctx: &BuildSystemContext) -> Result<(), Error> {
        let args = Self::build_args(ctx);
        let result = ctx
            .execute(&self.program, &args, &ctx.build_dir, "compile")
            .await?;

        if !result.success {
            return Err(BuildError::CompileFailed {
                status: result.exit_code,
                output: result.combined_output(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::BuildContext;
    use cpkg_types::{BuildType, PackageReference};
    use std::path::PathBuf;

    fn ctx() -> BuildSystemContext {
        BuildSystemContext::new(
            BuildContext::new(PackageReference::new("httpmockserver", "0.1")),
            PathBuf::from("/w/source/httpmockserver"),
            PathBuf::from("/w/build"),
        )
    }

    #[test]
    fn configure_args_start_with_source_dir() {
        let mut defs = Definitions::new();
        defs.insert("USE_SYSTEM_CURL".into(), "ON".into());
        defs.insert("BUILD_CPR_TESTS".into(), "OFF".into());

        let args = CMakeBuildSystem::configure_args(&ctx(), &defs);
        assert_eq!(
            args,
            [
                "/w/source/httpmockserver",
                "-DBUILD_CPR_TESTS=OFF",
                "-DUSE_SYSTEM_CURL=ON"
            ]
        );
    }

    #[test]
    fn build_args_add_parallel_only_above_one_job() {
        let serial = CMakeBuildSystem::build_args(&ctx());
        assert_eq!(serial, ["--build", ".", "--config", "Release"]);

        let parallel =
            CMakeBuildSystem::build_args(&ctx().with_jobs(8).with_build_type(BuildType::Debug));
        assert_eq!(
            parallel,
            ["--build", ".", "--config", "Debug", "--parallel", "8"]
        );
    }

    #[tokio::test]
    async fn missing_cmake_is_reported_per_stage() {
        let cmake = CMakeBuildSystem::new().with_program("/nonexistent/cmake");
        let dir = tempfile::tempdir().unwrap();
        let ctx = BuildSystemContext::new(
            BuildContext::new(PackageReference::new("httpmockserver", "0.1")),
            dir.path().join("source"),
            dir.path().join("build"),
        );

        let configure = cmake.configure(&ctx, &Definitions::new()).await.unwrap_err();
        assert_eq!(configure.stage(), Some("configure"));

        let compile = cmake.build(&ctx).await.unwrap_err();
        assert_eq!(compile.stage(), Some("compile"));
    }
}
