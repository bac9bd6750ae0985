//! CMake descriptors for the resolved dependency graph
//!
//! Two kinds of files are written into the build tree before configure:
//! `cpkgbuildinfo.cmake`, which the patched root `CMakeLists.txt` includes,
//! and one `Find<name>.cmake` module per dependency. Output depends only on
//! the graph, so identical graphs give byte-identical files.

use crate::utils::fileops::write_atomic;
use cpkg_errors::Error;
use cpkg_types::{DependencyGraph, ResolvedDependency};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// File name of the aggregate build-info descriptor
pub const BUILD_INFO_FILE: &str = "cpkgbuildinfo.cmake";

const HEADER: &str = "# Generated by cpkg. Do not edit.\n";

fn cmake_var_suffix(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn cmake_path(path: &Path) -> String {
    format!("\"{}\"", path.display().to_string().replace('\\', "/"))
}

fn joined<I: IntoIterator<Item = String>>(items: I) -> String {
    items.into_iter().collect::<Vec<_>>().join(" ")
}

/// Render `cpkgbuildinfo.cmake` for a graph
#[must_use]
pub fn render_build_info(graph: &DependencyGraph) -> String {
    let mut out = String::from(HEADER);
    let mut suffixes = Vec::new();

    for dep in graph.iter() {
        let suffix = cmake_var_suffix(&dep.reference.name);
        let _ = writeln!(out, "\n# {}", dep.reference);
        let _ = writeln!(out, "set(CPKG_ROOT_{suffix} {})", cmake_path(&dep.root));
        let _ = writeln!(
            out,
            "set(CPKG_INCLUDE_DIRS_{suffix} {})",
            joined(dep.absolute_include_dirs().iter().map(|p| cmake_path(p)))
        );
        let _ = writeln!(
            out,
            "set(CPKG_LIB_DIRS_{suffix} {})",
            joined(dep.absolute_lib_dirs().iter().map(|p| cmake_path(p)))
        );
        let _ = writeln!(out, "set(CPKG_LIBS_{suffix} {})", dep.libs.join(" "));
        let _ = writeln!(
            out,
            "set(CPKG_SYSTEM_LIBS_{suffix} {})",
            dep.system_libs.join(" ")
        );
        suffixes.push(suffix);
    }

    let aggregate = |kind: &str| joined(suffixes.iter().map(|s| format!("${{CPKG_{kind}_{s}}}")));

    out.push('\n');
    let _ = writeln!(out, "set(CPKG_INCLUDE_DIRS {})", aggregate("INCLUDE_DIRS"));
    let _ = writeln!(out, "set(CPKG_LIB_DIRS {})", aggregate("LIB_DIRS"));
    let _ = writeln!(
        out,
        "set(CPKG_LIBS {} {})",
        aggregate("LIBS"),
        aggregate("SYSTEM_LIBS")
    );

    out.push_str(
        "
macro(cpkg_basic_setup)
    include_directories(${CPKG_INCLUDE_DIRS})
    link_directories(${CPKG_LIB_DIRS})
    set(CMAKE_MODULE_PATH ${CMAKE_BINARY_DIR} ${CMAKE_MODULE_PATH})
    set(CMAKE_PREFIX_PATH ${CMAKE_BINARY_DIR} ${CMAKE_PREFIX_PATH})
endmacro()

macro(cpkg_target_link_libraries target)
    target_link_libraries(${target} ${CPKG_LIBS})
endmacro()
",
    );

    out
}

/// Render `Find<name>.cmake` providing the `<name>::<name>` imported target
#[must_use]
pub fn render_find_module(dep: &ResolvedDependency) -> String {
    let name = &dep.reference.name;
    let mut out = String::from(HEADER);
    let include_dirs = joined(dep.absolute_include_dirs().iter().map(|p| cmake_path(p)));
    let lib_dirs = joined(dep.absolute_lib_dirs().iter().map(|p| cmake_path(p)));
    let libs = joined(dep.libs.iter().chain(&dep.system_libs).cloned());

    let _ = writeln!(out, "\nset({name}_FOUND TRUE)");
    let _ = writeln!(out, "set({name}_VERSION {})", dep.reference.version);
    let _ = writeln!(out, "set({name}_INCLUDE_DIRS {include_dirs})");
    let _ = writeln!(out, "set({name}_LIB_DIRS {lib_dirs})");
    let _ = writeln!(out, "set({name}_LIBRARIES {libs})");
    let _ = write!(
        out,
        "
if(NOT TARGET {name}::{name})
    add_library({name}::{name} INTERFACE IMPORTED)
    set_property(TARGET {name}::{name} PROPERTY INTERFACE_INCLUDE_DIRECTORIES ${{{name}_INCLUDE_DIRS}})
    set_property(TARGET {name}::{name} PROPERTY INTERFACE_LINK_DIRECTORIES ${{{name}_LIB_DIRS}})
    set_property(TARGET {name}::{name} PROPERTY INTERFACE_LINK_LIBRARIES ${{{name}_LIBRARIES}})
endif()
"
    );

    out
}

/// Write every descriptor for `graph` into `build_dir`
///
/// Returns the written paths, build-info first, then find modules in graph
/// order.
///
/// # Errors
///
/// Returns an error if a file cannot be written.
pub fn write_generators(build_dir: &Path, graph: &DependencyGraph) -> Result<Vec<PathBuf>, Error> {
    std::fs::create_dir_all(build_dir).map_err(|e| Error::io_with_path(&e, build_dir))?;

    let mut written = Vec::with_capacity(graph.dependencies.len() + 1);

    let build_info = build_dir.join(BUILD_INFO_FILE);
    write_atomic(&build_info, render_build_info(graph).as_bytes())?;
    written.push(build_info);

    for dep in graph.iter() {
        let path = build_dir.join(format!("Find{}.cmake", dep.reference.name));
        write_atomic(&path, render_find_module(dep).as_bytes())?;
        written.push(path);
    }

    Ok(written)
}
