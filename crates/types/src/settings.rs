//! Build-matrix axes and the concrete point the host builds against

use clap::ValueEnum;
use cpkg_errors::PackageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One axis of the build matrix a recipe can be sensitive to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setting {
    Os,
    Arch,
    Compiler,
    BuildType,
}

impl Setting {
    /// Every axis, in the order they appear in package ids and metadata
    pub const ALL: [Setting; 4] = [Self::Os, Self::Arch, Self::Compiler, Self::BuildType];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Os => "os",
            Self::Arch => "arch",
            Self::Compiler => "compiler",
            Self::BuildType => "build_type",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Macos,
    Windows,
    Freebsd,
}

impl Os {
    /// Operating system of the running process
    #[must_use]
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "freebsd") {
            Self::Freebsd
        } else {
            Self::Linux
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
            Self::Freebsd => "freebsd",
        }
    }
}

/// Target CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Arch {
    #[serde(rename = "x86_64")]
    #[value(name = "x86_64")]
    X86_64,
    #[serde(rename = "x86")]
    #[value(name = "x86")]
    X86,
    #[serde(rename = "armv7")]
    #[value(name = "armv7")]
    Armv7,
    #[serde(rename = "armv8")]
    #[value(name = "armv8")]
    Armv8,
}

impl Arch {
    /// Architecture of the running process
    #[must_use]
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86" => Self::X86,
            "arm" => Self::Armv7,
            "aarch64" => Self::Armv8,
            _ => Self::X86_64,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::X86 => "x86",
            Self::Armv7 => "armv7",
            Self::Armv8 => "armv8",
        }
    }
}

/// CMake build configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum BuildType {
    #[value(name = "Debug", alias = "debug")]
    Debug,
    #[value(name = "Release", alias = "release")]
    Release,
    #[value(name = "RelWithDebInfo", alias = "relwithdebinfo")]
    RelWithDebInfo,
    #[value(name = "MinSizeRel", alias = "minsizerel")]
    MinSizeRel,
}

impl BuildType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl Default for BuildType {
    fn default() -> Self {
        Self::Release
    }
}

/// Compiler family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CompilerKind {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
}

impl CompilerKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::AppleClang => "apple-clang",
            Self::Msvc => "msvc",
        }
    }
}

/// Compiler identity and version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Compiler {
    pub name: CompilerKind,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libcxx: Option<String>,
}

impl Compiler {
    pub fn new(name: CompilerKind, version: impl Into<String>) -> Self {
        Self {
            name,
            version: version.into(),
            libcxx: None,
        }
    }

    #[must_use]
    pub fn with_libcxx(mut self, libcxx: impl Into<String>) -> Self {
        self.libcxx = Some(libcxx.into());
        self
    }
}

/// One concrete (OS, architecture, compiler, build type) combination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixPoint {
    pub os: Os,
    pub arch: Arch,
    pub compiler: Compiler,
    #[serde(default)]
    pub build_type: BuildType,
}

impl MatrixPoint {
    /// Flattened `setting -> value` pairs for the given axes, in axis order
    ///
    /// The compiler axis expands into `compiler`, `compiler.version` and,
    /// when set, `compiler.libcxx`.
    #[must_use]
    pub fn values_for(&self, axes: &[Setting]) -> Vec<(String, String)> {
        let mut values = Vec::new();
        for axis in Setting::ALL.iter().filter(|a| axes.contains(a)) {
            match axis {
                Setting::Os => values.push(("os".to_string(), self.os.as_str().to_string())),
                Setting::Arch => {
                    values.push(("arch".to_string(), self.arch.as_str().to_string()));
                }
                Setting::Compiler => {
                    values.push((
                        "compiler".to_string(),
                        self.compiler.name.as_str().to_string(),
                    ));
                    values.push((
                        "compiler.version".to_string(),
                        self.compiler.version.clone(),
                    ));
                    if let Some(libcxx) = &self.compiler.libcxx {
                        values.push(("compiler.libcxx".to_string(), libcxx.clone()));
                    }
                }
                Setting::BuildType => values.push((
                    "build_type".to_string(),
                    self.build_type.as_str().to_string(),
                )),
            }
        }
        values
    }
}

macro_rules! impl_setting_parse {
    ($ty:ty, $setting:literal) => {
        impl FromStr for $ty {
            type Err = PackageError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as ValueEnum>::from_str(s, true).map_err(|_| PackageError::InvalidSetting {
                    setting: $setting.to_string(),
                    value: s.to_string(),
                })
            }
        }
    };
}

impl_setting_parse!(Os, "os");
impl_setting_parse!(Arch, "arch");
impl_setting_parse!(BuildType, "build_type");
impl_setting_parse!(CompilerKind, "compiler");
