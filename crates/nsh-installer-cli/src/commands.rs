//! Command execution for the installer CLI.

use std::path::Path;

use anyhow::{Context, Result};

use nsh_installer::{
    InstallError, InstallReport, InstallSettings, Installer, PlatformProfile, PrivilegeCheck,
    SystemPathStore, SystemPrivilege,
};

use crate::summary::print_step;

/// Refuses early when the process is not elevated.
///
/// Runs before logging is set up so an unprivileged run does not even create
/// the `--log-file`. The installer checks again before its first write.
pub fn ensure_elevated(privilege: &dyn PrivilegeCheck) -> Result<()> {
    if privilege.is_elevated() {
        return Ok(());
    }
    Err(InstallError::NotElevated {
        executable: PlatformProfile::current().executable_name.to_string(),
    }
    .into())
}

/// Loads settings from an optional file and applies the CLI project root.
pub fn load_settings(config: Option<&Path>, project_dir: Option<&Path>) -> Result<InstallSettings> {
    let mut settings = match config {
        Some(path) => InstallSettings::from_file(path)
            .with_context(|| format!("load settings from {}", path.display()))?,
        None => InstallSettings::default(),
    };
    if let Some(dir) = project_dir {
        settings = settings.with_project_root(dir);
    }
    Ok(settings)
}

/// Resolves an installer for the running platform.
pub fn build_installer(settings: &InstallSettings) -> Result<Installer> {
    let profile = PlatformProfile::current();
    tracing::info!(platform = %profile.os, "Detected platform");
    Installer::new(profile, settings).context("resolve install plan")
}

/// Runs the full pipeline against the real system.
pub fn run_install(installer: &Installer) -> Result<InstallReport> {
    let report = installer.run_with(&SystemPrivilege, &mut SystemPathStore, print_step)?;
    Ok(report)
}
