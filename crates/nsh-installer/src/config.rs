//! Configuration types for the installer.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{InstallError, Result};

/// Vendor subfolder created under the platform install directory.
pub const DEFAULT_VENDOR_DIR: &str = "theHamdiz";

/// Build output directory, relative to the project root.
pub const DEFAULT_BUILD_OUTPUT_DIR: &str = "target";

/// Well-known directory the POSIX symlink is created in.
pub const DEFAULT_LINK_DIR: &str = "/usr/local/bin";

/// Settings for one installer run.
///
/// Every field is optional in the settings file; missing fields keep the
/// defaults the installer always shipped with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallSettings {
    /// Directory the build script and build output are resolved against.
    /// `None` means the current working directory.
    pub project_root: Option<PathBuf>,

    /// Build output tree, relative to the project root.
    pub build_output_dir: PathBuf,

    /// Vendor subfolder under the install directory.
    pub vendor_dir: String,

    /// Overrides the platform install directory.
    pub target_dir: Option<PathBuf>,

    /// Overrides the directory the POSIX symlink is created in.
    pub link_dir: Option<PathBuf>,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            project_root: None,
            build_output_dir: PathBuf::from(DEFAULT_BUILD_OUTPUT_DIR),
            vendor_dir: DEFAULT_VENDOR_DIR.to_string(),
            target_dir: None,
            link_dir: None,
        }
    }
}

impl InstallSettings {
    /// Reads settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InstallError::Config(format!(
                "failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Settings rooted at a specific project directory.
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Checks values that would otherwise escape the install directory.
    pub fn validate(&self) -> Result<()> {
        let vendor = Path::new(&self.vendor_dir);
        if self.vendor_dir.is_empty()
            || vendor.is_absolute()
            || vendor.components().count() != 1
            || self.vendor_dir == ".."
        {
            return Err(InstallError::Config(format!(
                "vendor_dir must be a single directory name, got '{}'",
                self.vendor_dir
            )));
        }
        if self.build_output_dir.as_os_str().is_empty() {
            return Err(InstallError::Config(
                "build_output_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves the project root, falling back to the working directory.
    pub fn resolve_project_root(&self) -> Result<PathBuf> {
        match &self.project_root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir().map_err(|e| {
                InstallError::Config(format!("could not determine working directory: {e}"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = InstallSettings::default();
        assert!(settings.project_root.is_none());
        assert_eq!(settings.build_output_dir, PathBuf::from("target"));
        assert_eq!(settings.vendor_dir, "theHamdiz");
        assert!(settings.target_dir.is_none());
        assert!(settings.link_dir.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: InstallSettings =
            serde_json::from_str(r#"{ "link_dir": "/opt/bin" }"#).unwrap();
        assert_eq!(settings.link_dir, Some(PathBuf::from("/opt/bin")));
        assert_eq!(settings.vendor_dir, DEFAULT_VENDOR_DIR);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_str::<InstallSettings>(r#"{ "vendor": "x" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_vendor_dir_must_be_single_component() {
        for bad in ["", "a/b", "..", "/abs"] {
            let settings = InstallSettings {
                vendor_dir: bad.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("install.json");
        std::fs::write(&path, r#"{ "vendor_dir": "acme", "target_dir": "/opt" }"#).unwrap();

        let settings = InstallSettings::from_file(&path).unwrap();
        assert_eq!(settings.vendor_dir, "acme");
        assert_eq!(settings.target_dir, Some(PathBuf::from("/opt")));

        let missing = InstallSettings::from_file(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(InstallError::Config(_))));
    }

    #[test]
    fn test_explicit_project_root() {
        let settings = InstallSettings::default().with_project_root("/work/nsh");
        assert_eq!(
            settings.resolve_project_root().unwrap(),
            PathBuf::from("/work/nsh")
        );
    }
}
