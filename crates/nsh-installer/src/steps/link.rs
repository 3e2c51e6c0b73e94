//! POSIX path integration: a symlink in a well-known binary directory.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{InstallError, Result};

/// What currently occupies the link location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Nothing at the link path.
    Missing,
    /// A symbolic link (possibly dangling).
    Symlink,
    /// A regular file or other non-directory entry.
    File,
    /// A real directory.
    Directory,
}

impl LinkState {
    /// Get a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Missing => "no entry",
            Self::Symlink => "symlink",
            Self::File => "regular file",
            Self::Directory => "directory",
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn integration_error(path: &Path, what: &str, e: io::Error) -> InstallError {
    InstallError::PathIntegration {
        path: path.to_path_buf(),
        message: format!("{what}: {e}"),
    }
}

/// Inspects the link path without following symlinks.
pub fn detect_link_state(link: &Path) -> Result<LinkState> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => Ok(LinkState::Symlink),
        Ok(meta) if meta.is_dir() => Ok(LinkState::Directory),
        Ok(_) => Ok(LinkState::File),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LinkState::Missing),
        Err(e) => Err(integration_error(link, "failed to inspect", e)),
    }
}

/// Points `link` at `artifact`, clearing whatever was there before.
///
/// Files and symlinks are unlinked, directories are removed with their
/// contents. Returns the state found before relinking.
pub fn replace_link(link: &Path, artifact: &Path) -> Result<LinkState> {
    let previous = detect_link_state(link)?;
    match previous {
        LinkState::Missing => {}
        LinkState::Symlink | LinkState::File => {
            tracing::debug!("Removing existing {} at {}", previous, link.display());
            fs::remove_file(link).map_err(|e| integration_error(link, "failed to remove", e))?;
        }
        LinkState::Directory => {
            tracing::warn!("Removing directory {} to make room for link", link.display());
            fs::remove_dir_all(link)
                .map_err(|e| integration_error(link, "failed to remove directory", e))?;
        }
    }

    create_symlink(artifact, link)?;
    tracing::info!("Linked {} -> {}", link.display(), artifact.display());
    Ok(previous)
}

#[cfg(unix)]
fn create_symlink(artifact: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(artifact, link)
        .map_err(|e| integration_error(link, "failed to create symlink", e))
}

#[cfg(not(unix))]
fn create_symlink(_artifact: &Path, link: &Path) -> Result<()> {
    Err(InstallError::PathIntegration {
        path: link.to_path_buf(),
        message: "symlink integration is only supported on POSIX systems".to_string(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn artifact_in(dir: &Path) -> std::path::PathBuf {
        let artifact = dir.join("nsh-real");
        fs::write(&artifact, b"bin").unwrap();
        artifact
    }

    #[test]
    fn test_detect_states() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entry");
        assert_eq!(detect_link_state(&path).unwrap(), LinkState::Missing);

        fs::write(&path, b"x").unwrap();
        assert_eq!(detect_link_state(&path).unwrap(), LinkState::File);
        fs::remove_file(&path).unwrap();

        fs::create_dir(&path).unwrap();
        assert_eq!(detect_link_state(&path).unwrap(), LinkState::Directory);
        fs::remove_dir(&path).unwrap();

        std::os::unix::fs::symlink(dir.path().join("nowhere"), &path).unwrap();
        assert_eq!(detect_link_state(&path).unwrap(), LinkState::Symlink);
    }

    #[test]
    fn test_creates_link_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_in(dir.path());
        let link = dir.path().join("nsh");

        let previous = replace_link(&link, &artifact).unwrap();
        assert_eq!(previous, LinkState::Missing);
        assert_eq!(fs::read_link(&link).unwrap(), artifact);
    }

    #[test]
    fn test_replaces_directory_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_in(dir.path());
        let link = dir.path().join("nsh");
        fs::create_dir_all(link.join("nested/deeper")).unwrap();
        fs::write(link.join("nested/deeper/file"), b"x").unwrap();

        let previous = replace_link(&link, &artifact).unwrap();
        assert_eq!(previous, LinkState::Directory);
        assert_eq!(fs::read_link(&link).unwrap(), artifact);
    }

    #[test]
    fn test_replaces_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_in(dir.path());
        let link = dir.path().join("nsh");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();

        let previous = replace_link(&link, &artifact).unwrap();
        assert_eq!(previous, LinkState::Symlink);
        assert_eq!(fs::read_link(&link).unwrap(), artifact);
    }

    #[test]
    fn test_missing_link_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = artifact_in(dir.path());
        let link = dir.path().join("no-such-dir").join("nsh");

        let result = replace_link(&link, &artifact);
        assert!(matches!(result, Err(InstallError::PathIntegration { .. })));
    }
}
