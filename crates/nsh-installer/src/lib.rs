//! Installer for the `nsh` command-line tool.
//!
//! This crate builds `nsh` from its source tree, installs the resulting
//! executable into a system location and makes it reachable from any shell.
//!
//! # Overview
//!
//! A run goes through these steps, stopping at the first failure:
//!
//! 1. Refuse to continue without administrative/root privileges
//! 2. Run `build/build.sh` (or `build\build.bat` on Windows)
//! 3. Normalize permissions of everything under the build output directory
//! 4. Copy `target/<platform_id>/<exe>` to `<target_dir>/theHamdiz/<exe>`
//!    and verify the copy with SHA256
//! 5. Symlink `/usr/local/bin/nsh` on macOS/Linux, or append the install
//!    directory to the machine `PATH` on Windows
//!
//! # Platforms
//!
//! | Platform | Build script        | Install directory    | Executable |
//! |----------|---------------------|----------------------|------------|
//! | Windows  | `build\build.bat`   | `C:\Program Files\`  | `nsh.exe`  |
//! | Linux    | `build/build.sh`    | `/usr/local/bin/`    | `nsh`      |
//! | macOS    | `build/build.sh`    | `/usr/local/bin/`    | `nsh`      |
//!
//! # Example
//!
//! ```no_run
//! use nsh_installer::{InstallSettings, install};
//!
//! fn main() -> nsh_installer::Result<()> {
//!     let settings = InstallSettings::default().with_project_root("/src/nsh");
//!     let report = install(&settings)?;
//!     println!("Installed to {}", report.artifact.path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod error;
pub mod installer;
pub mod plan;
pub mod platform;
pub mod privilege;

// Individual steps
pub mod steps;

// Re-export main types for convenience
pub use config::InstallSettings;
pub use error::{ErrorKind, InstallError, Result};
pub use installer::{InstallReport, Installer, Integration, Step, StepOutcome};
pub use plan::InstallPlan;
pub use platform::{Os, PlatformProfile};
pub use privilege::{PrivilegeCheck, SystemPrivilege};

// Re-export step functions and types
pub use steps::build::{run_build_script, run_script};
pub use steps::install::{InstalledArtifact, install_artifact};
pub use steps::link::{LinkState, detect_link_state, replace_link};
pub use steps::path_env::{
    PathStore, PathUpdate, SystemPathStore, add_to_system_path, append_path_entry,
};
pub use steps::permissions::normalize_permissions;
pub use steps::verify::{compute_file_sha256, verify_copy};

/// Current version of the installer.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install `nsh` for the running platform using the real system.
pub fn install(settings: &InstallSettings) -> Result<InstallReport> {
    let installer = Installer::new(PlatformProfile::current(), settings)?;
    installer.run(&SystemPrivilege, &mut SystemPathStore)
}
