//! Resolved paths for one installer run.

use std::path::{Path, PathBuf};

use crate::config::{DEFAULT_LINK_DIR, InstallSettings};
use crate::error::Result;
use crate::platform::PlatformProfile;

/// Every path the pipeline reads or writes, resolved up front.
///
/// Building a plan never touches the filesystem beyond asking for the
/// working directory when no project root was configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// Platform identifier (`win32`, `linux`, `darwin`).
    pub platform_id: &'static str,
    /// File name of the executable.
    pub executable_name: &'static str,
    /// Directory the build runs in.
    pub project_root: PathBuf,
    /// Build script locations, tried in order.
    pub script_candidates: Vec<PathBuf>,
    /// Build output tree whose permissions are normalized.
    pub build_output_dir: PathBuf,
    /// Executable produced by the build.
    pub source_artifact: PathBuf,
    /// `<target_dir>/<vendor>`.
    pub install_dir: PathBuf,
    /// `<install_dir>/<executable_name>`.
    pub installed_artifact: PathBuf,
    /// Symlink location; `None` on Windows, which integrates via `PATH`.
    pub link_path: Option<PathBuf>,
}

impl InstallPlan {
    /// Resolves the plan for a profile and settings.
    pub fn resolve(profile: &PlatformProfile, settings: &InstallSettings) -> Result<Self> {
        settings.validate()?;
        let project_root = settings.resolve_project_root()?;
        let build_output_dir = project_root.join(&settings.build_output_dir);
        let source_artifact = build_output_dir
            .join(profile.platform_id())
            .join(profile.executable_name);

        let target_dir = settings
            .target_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(profile.target_dir));
        let install_dir = target_dir.join(&settings.vendor_dir);
        let installed_artifact = install_dir.join(profile.executable_name);

        let link_path = profile.os.is_posix().then(|| {
            settings
                .link_dir
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_LINK_DIR))
                .join(profile.executable_name)
        });

        let plan = Self {
            platform_id: profile.platform_id(),
            executable_name: profile.executable_name,
            script_candidates: profile.script_candidates(&project_root),
            project_root,
            build_output_dir,
            source_artifact,
            install_dir,
            installed_artifact,
            link_path,
        };
        tracing::debug!(?plan, "Resolved install plan");
        Ok(plan)
    }

    /// Labelled rows describing the plan, in pipeline order.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let scripts = self
            .script_candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut rows = vec![
            ("Platform", self.platform_id.to_string()),
            ("Project root", self.project_root.display().to_string()),
            ("Build script", scripts),
            ("Build output", self.build_output_dir.display().to_string()),
            ("Artifact", self.source_artifact.display().to_string()),
            ("Install to", self.installed_artifact.display().to_string()),
        ];
        match &self.link_path {
            Some(link) => rows.push(("Symlink", link.display().to_string())),
            None => rows.push(("PATH entry", self.install_dir.display().to_string())),
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Os;

    #[test]
    fn test_default_macos_layout() {
        let settings = InstallSettings::default().with_project_root("/src/nsh");
        let plan = InstallPlan::resolve(&PlatformProfile::for_os(Os::MacOs), &settings).unwrap();

        assert_eq!(plan.source_artifact, PathBuf::from("/src/nsh/target/darwin/nsh"));
        assert_eq!(
            plan.installed_artifact,
            PathBuf::from("/usr/local/bin/theHamdiz/nsh")
        );
        assert_eq!(plan.link_path, Some(PathBuf::from("/usr/local/bin/nsh")));
    }

    #[test]
    fn test_windows_has_no_link() {
        let settings = InstallSettings::default().with_project_root("project");
        let plan = InstallPlan::resolve(&PlatformProfile::for_os(Os::Windows), &settings).unwrap();

        assert!(plan.link_path.is_none());
        assert!(plan.installed_artifact.ends_with("nsh.exe"));
        assert!(plan.install_dir.ends_with("theHamdiz"));
        assert!(plan.rows().iter().any(|(label, _)| *label == "PATH entry"));
    }

    #[test]
    fn test_overrides() {
        let settings = InstallSettings {
            target_dir: Some(PathBuf::from("/opt")),
            link_dir: Some(PathBuf::from("/opt/bin")),
            vendor_dir: "acme".to_string(),
            ..Default::default()
        }
        .with_project_root("/src");
        let plan = InstallPlan::resolve(&PlatformProfile::for_os(Os::Linux), &settings).unwrap();

        assert_eq!(plan.installed_artifact, PathBuf::from("/opt/acme/nsh"));
        assert_eq!(plan.link_path, Some(PathBuf::from("/opt/bin/nsh")));
        assert_eq!(plan.source_artifact, PathBuf::from("/src/target/linux/nsh"));
    }
}
