//! Recipe for the `httpmockserver` C++ HTTP mock server library

use super::model::{Metadata, RecipeSpec, Source};
use crate::packaging::{CopyRule, RuleRoot};
use crate::patch::TextPatch;
use cpkg_types::{LinkageMetadata, OptionSet, PackageReference, Setting};

pub const NAME: &str = "httpmockserver";

/// Build the `httpmockserver/0.1` recipe
#[must_use]
pub fn recipe() -> RecipeSpec {
    RecipeSpec {
        metadata: Metadata {
            name: NAME.to_string(),
            version: "0.1".to_string(),
            description: "C++ HTTP mock server".to_string(),
            license: "MIT".to_string(),
            homepage: "https://github.com/seznam/httpmockserver".to_string(),
            url: Some("https://github.com/conan-io/conan-center-index".to_string()),
            topics: vec!["mock".to_string()],
        },
        settings: Setting::ALL.to_vec(),
        requires: vec![
            PackageReference::new("cpr", "1.5.0"),
            PackageReference::new("gtest", "1.10.0"),
        ],
        source: Source::default(),
        patches: vec![
            TextPatch::new(
                "CMakeLists.txt",
                "project(httpmockserver LANGUAGES CXX)",
                [
                    "include(${CMAKE_BINARY_DIR}/cpkgbuildinfo.cmake)",
                    "cpkg_basic_setup()",
                ],
            ),
            TextPatch::new(
                "src/CMakeLists.txt",
                "install(TARGETS httpmockserver ARCHIVE DESTINATION lib)",
                ["cpkg_target_link_libraries(httpmockserver)"],
            ),
        ],
        options: OptionSet::new()
            .with("USE_ALL_SYSTEM_LIBS", true)
            .with("USE_SYSTEM_CURL", true)
            .with("BUILD_CPR_TESTS", false)
            .with("GENERATE_COVERAGE", false)
            .with("USE_SYSTEM_GTEST", false)
            .with("CMAKE_USE_OPENSSL", false),
        package: vec![
            CopyRule::new("*.h", RuleRoot::Source, "include/httpmockserver").from_dir("include"),
            CopyRule::new("*.a", RuleRoot::Build, "lib"),
        ],
        linkage: LinkageMetadata::new()
            .packaged("httpmockserver")
            .system("microhttpd"),
    }
}
