//! Platform detection and the per-platform install profile.
//!
//! The profile is selected once at startup and passed to every step; nothing
//! in the pipeline consults the running platform on its own.

use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported operating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Microsoft Windows.
    Windows,
    /// Linux.
    Linux,
    /// macOS / Darwin.
    MacOs,
}

impl Os {
    /// Detect the current operating system.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// Platform identifier used in the build output layout (`target/<id>/`).
    #[must_use]
    pub const fn platform_id(&self) -> &'static str {
        match self {
            Self::Windows => "win32",
            Self::Linux => "linux",
            Self::MacOs => "darwin",
        }
    }

    /// Get a human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::MacOs => "macOS",
        }
    }

    /// Whether path integration uses a symlink rather than `PATH`.
    #[must_use]
    pub const fn is_posix(&self) -> bool {
        !matches!(self, Self::Windows)
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win32" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "darwin" => Ok(Self::MacOs),
            other => Err(format!("unknown platform identifier: {other}")),
        }
    }
}

/// Fixed install profile for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    /// The operating system this profile belongs to.
    pub os: Os,
    /// Build script, relative to the project root.
    pub build_script: &'static str,
    /// System directory the vendor folder is created in.
    pub target_dir: &'static str,
    /// File name of the built and installed executable.
    pub executable_name: &'static str,
}

impl PlatformProfile {
    /// Profile for the platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::for_os(Os::current())
    }

    /// Profile for a specific platform.
    #[must_use]
    pub const fn for_os(os: Os) -> Self {
        match os {
            Os::Windows => Self {
                os,
                build_script: "build\\build.bat",
                target_dir: "C:\\Program Files\\",
                executable_name: "nsh.exe",
            },
            Os::Linux | Os::MacOs => Self {
                os,
                build_script: "build/build.sh",
                target_dir: "/usr/local/bin/",
                executable_name: "nsh",
            },
        }
    }

    /// Platform identifier of this profile.
    #[must_use]
    pub const fn platform_id(&self) -> &'static str {
        self.os.platform_id()
    }

    /// The build script file name with its leading directory removed.
    #[must_use]
    pub fn script_file_name(&self) -> &'static str {
        self.build_script
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.build_script)
    }

    /// Build script locations to try, in order.
    ///
    /// The second candidate covers running from inside the build directory.
    #[must_use]
    pub fn script_candidates(&self, project_root: &Path) -> Vec<PathBuf> {
        let relative: PathBuf = self
            .build_script
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty())
            .collect();
        vec![
            project_root.join(relative),
            project_root.join(self.script_file_name()),
        ]
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::current()
    }
}
