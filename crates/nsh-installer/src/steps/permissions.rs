//! Permission normalization of the build output tree.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::{InstallError, Result};

/// Mode applied to regular files (rwxr-xr-x).
pub const FILE_MODE: u32 = 0o755;

/// Mode applied to directories, so a root-owned build stays removable.
pub const DIR_MODE: u32 = 0o777;

/// Sets [`FILE_MODE`] on every file and [`DIR_MODE`] on every directory
/// below `root`, at any depth.
///
/// The root itself is left alone. Symlinks are not followed. Returns the
/// number of entries changed.
pub fn normalize_permissions(root: &Path) -> Result<usize> {
    tracing::info!("Normalizing permissions under {}", root.display());

    if !root.is_dir() {
        return Err(InstallError::Permission {
            path: root.to_path_buf(),
            message: "build output directory does not exist".to_string(),
        });
    }

    let mut count = 0usize;
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| InstallError::Permission {
            path: e
                .path()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf),
            message: e.to_string(),
        })?;

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            tracing::debug!("Skipping symlink {}", entry.path().display());
            continue;
        }

        let mode = if file_type.is_dir() { DIR_MODE } else { FILE_MODE };
        set_mode(entry.path(), mode)?;
        count += 1;
    }

    tracing::debug!(count, "Permissions normalized");
    Ok(count)
}

/// Sets the permission bits of a single path.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
        InstallError::Permission {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })
}

/// Clears the read-only flag; Windows has no mode bits.
#[cfg(not(unix))]
pub fn set_mode(path: &Path, _mode: u32) -> Result<()> {
    let to_error = |e: std::io::Error| InstallError::Permission {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut permissions = std::fs::metadata(path).map_err(to_error)?.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        std::fs::set_permissions(path, permissions).map_err(to_error)?;
    }
    Ok(())
}
