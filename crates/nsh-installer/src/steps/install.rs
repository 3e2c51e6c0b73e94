//! Installation step: place the built executable in the install directory.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};
use crate::plan::InstallPlan;
use crate::privilege::PrivilegeCheck;
use crate::steps::permissions::{FILE_MODE, set_mode};
use crate::steps::verify::verify_copy;

/// Result of a successful installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArtifact {
    /// Final location of the executable.
    pub path: PathBuf,
    /// SHA256 of the installed file.
    pub sha256: String,
}

/// Copies the build artifact into `<target_dir>/<vendor>/`.
///
/// The source is kept so the installer can be re-run without rebuilding.
/// Privileges are checked again right before the first write.
pub fn install_artifact(
    plan: &InstallPlan,
    privilege: &dyn PrivilegeCheck,
) -> Result<InstalledArtifact> {
    let source = &plan.source_artifact;
    if !source.is_file() {
        return Err(InstallError::Installation {
            path: source.clone(),
            message: "build artifact not found".to_string(),
        });
    }

    if !privilege.is_elevated() {
        return Err(InstallError::NotElevated {
            executable: plan.executable_name.to_string(),
        });
    }

    if !plan.install_dir.exists() {
        tracing::info!("Creating install directory {}", plan.install_dir.display());
        fs::create_dir_all(&plan.install_dir).map_err(|e| InstallError::Installation {
            path: plan.install_dir.clone(),
            message: format!("failed to create directory: {e}"),
        })?;
    }

    tracing::info!(
        "Installing {} to {}",
        source.display(),
        plan.installed_artifact.display()
    );
    copy_atomically(source, &plan.installed_artifact)?;
    set_mode(&plan.installed_artifact, FILE_MODE)?;

    let sha256 = verify_copy(source, &plan.installed_artifact)?;

    Ok(InstalledArtifact {
        path: plan.installed_artifact.clone(),
        sha256,
    })
}

/// Writes `source` to a temporary file next to `dest` and renames it over
/// `dest`, so a half-written binary is never visible under the final name.
fn copy_atomically(source: &Path, dest: &Path) -> Result<()> {
    let dest_dir = dest.parent().ok_or_else(|| InstallError::Installation {
        path: dest.to_path_buf(),
        message: "destination has no parent directory".to_string(),
    })?;
    let to_error = |path: &Path, what: &str, e: io::Error| InstallError::Installation {
        path: path.to_path_buf(),
        message: format!("{what}: {e}"),
    };

    let mut input = File::open(source).map_err(|e| to_error(source, "failed to open", e))?;
    let mut temp_file = tempfile::NamedTempFile::new_in(dest_dir)
        .map_err(|e| to_error(dest_dir, "failed to create temp file", e))?;

    let bytes = io::copy(&mut input, temp_file.as_file_mut())
        .map_err(|e| to_error(dest, "failed to write", e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| to_error(dest, "failed to sync", e))?;

    temp_file
        .persist(dest)
        .map_err(|e| to_error(dest, "failed to move into place", e.error))?;

    tracing::debug!(bytes, "Copied artifact");
    Ok(())
}
