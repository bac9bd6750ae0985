//! Build system abstraction
//!
//! The lifecycle only ever talks to a [`BuildSystem`]: it hands over a
//! source directory, a build directory and a set of definitions, and expects
//! configure and build to either succeed or fail with the tool's output.

use async_trait::async_trait;
use cpkg_errors::Error;
use cpkg_types::{MatrixPoint, OptionSet};
use std::collections::BTreeMap;
use std::path::Path;

mod cmake;
mod core;

pub use cmake::CMakeBuildSystem;
pub use core::{BuildCommandResult, BuildSystemContext};

/// Ordered `NAME -> VALUE` definitions passed to the configure step
pub type Definitions = BTreeMap<String, String>;

/// Trait for build system implementations
#[async_trait]
pub trait BuildSystem: Send + Sync {
    /// Configure phase
    async fn configure(&self, ctx: &BuildSystemContext, definitions: &Definitions)
        -> Result<(), Error>;

    /// Build phase, all default targets
    async fn build(&self, ctx: &BuildSystemContext) -> Result<(), Error>;
}

/// Definitions for one configure run
///
/// Matrix-derived values come first and recipe options are layered on top,
/// so a recipe option wins when both use the same name.
#[must_use]
pub fn configure_definitions(
    options: &OptionSet,
    matrix: &MatrixPoint,
    build_dir: &Path,
) -> Definitions {
    let mut defs = Definitions::new();
    let build_dir = build_dir.display().to_string();

    defs.insert(
        "CMAKE_BUILD_TYPE".to_string(),
        matrix.build_type.as_str().to_string(),
    );
    defs.insert("CPKG_OS".to_string(), matrix.os.as_str().to_string());
    defs.insert("CPKG_ARCH".to_string(), matrix.arch.as_str().to_string());
    defs.insert(
        "CPKG_COMPILER".to_string(),
        matrix.compiler.name.as_str().to_string(),
    );
    defs.insert(
        "CPKG_COMPILER_VERSION".to_string(),
        matrix.compiler.version.clone(),
    );
    if let Some(libcxx) = &matrix.compiler.libcxx {
        defs.insert("CPKG_LIBCXX".to_string(), libcxx.clone());
    }
    defs.insert(
        "CMAKE_EXPORT_NO_PACKAGE_REGISTRY".to_string(),
        "ON".to_string(),
    );
    // Generated Find<name>.cmake files live in the build tree
    defs.insert("CMAKE_MODULE_PATH".to_string(), build_dir.clone());
    defs.insert("CMAKE_PREFIX_PATH".to_string(), build_dir);

    for (name, value) in options.iter() {
        defs.insert(name.to_string(), value.cmake_value().to_string());
    }

    defs
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpkg_types::{Arch, BuildType, Compiler, CompilerKind, Os};

    fn matrix() -> MatrixPoint {
        MatrixPoint {
            os: Os::Linux,
            arch: Arch::X86_64,
            compiler: Compiler::new(CompilerKind::Gcc, "9"),
            build_type: BuildType::Debug,
        }
    }

    #[test]
    fn options_render_as_on_off() {
        let options = OptionSet::new()
            .with("USE_SYSTEM_CURL", true)
            .with("BUILD_CPR_TESTS", false);
        let defs = configure_definitions(&options, &matrix(), Path::new("/w/build"));

        assert_eq!(defs["USE_SYSTEM_CURL"], "ON");
        assert_eq!(defs["BUILD_CPR_TESTS"], "OFF");
        assert_eq!(defs["CMAKE_BUILD_TYPE"], "Debug");
        assert_eq!(defs["CPKG_COMPILER"], "gcc");
        assert_eq!(defs["CMAKE_MODULE_PATH"], "/w/build");
        assert!(!defs.contains_key("CPKG_LIBCXX"));
    }

    #[test]
    fn recipe_option_wins_over_derived() {
        let options = OptionSet::new().with("CMAKE_BUILD_TYPE", "Release");
        let defs = configure_definitions(&options, &matrix(), Path::new("/w/build"));
        assert_eq!(defs["CMAKE_BUILD_TYPE"], "Release");
    }
}
