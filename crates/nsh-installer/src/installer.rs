//! The install pipeline.
//!
//! Privilege check, build, permission normalization, installation and path
//! integration run strictly in that order; the first error ends the run and
//! nothing already done is rolled back.

use std::path::PathBuf;

use crate::config::InstallSettings;
use crate::error::{InstallError, Result};
use crate::plan::InstallPlan;
use crate::platform::PlatformProfile;
use crate::privilege::PrivilegeCheck;
use crate::steps::build::run_build_script;
use crate::steps::install::{InstalledArtifact, install_artifact};
use crate::steps::link::{LinkState, replace_link};
use crate::steps::path_env::{PathStore, PathUpdate, add_to_system_path};
use crate::steps::permissions::{FILE_MODE, normalize_permissions, set_mode};

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Administrative privilege check.
    Privilege,
    /// External build script.
    Build,
    /// Build output permission normalization.
    Permissions,
    /// Copy into the install directory.
    Install,
    /// Symlink or `PATH` update.
    PathIntegration,
}

impl Step {
    /// Get a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Privilege => "Privileges",
            Self::Build => "Build",
            Self::Permissions => "Permissions",
            Self::Install => "Install",
            Self::PathIntegration => "Path integration",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A completed step and the message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// The step that completed.
    pub step: Step,
    /// One-line description of what was done.
    pub message: String,
}

/// How the installed executable was made reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integration {
    /// POSIX symlink.
    Linked {
        /// Location of the link.
        link: PathBuf,
        /// What occupied the location before.
        previous: LinkState,
    },
    /// Windows `PATH` update.
    SystemPath(PathUpdate),
}

/// Everything a successful run did.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// The resolved plan that was executed.
    pub plan: InstallPlan,
    /// Build script that was run.
    pub build_script: PathBuf,
    /// Number of build output entries whose permissions were set.
    pub normalized_entries: usize,
    /// The installed executable.
    pub artifact: InstalledArtifact,
    /// Symlink or `PATH` result.
    pub integration: Integration,
    /// Completed steps, in order.
    pub steps: Vec<StepOutcome>,
}

/// Runs the install pipeline for one platform profile.
#[derive(Debug, Clone)]
pub struct Installer {
    profile: PlatformProfile,
    plan: InstallPlan,
}

impl Installer {
    /// Creates an installer, resolving all paths up front.
    pub fn new(profile: PlatformProfile, settings: &InstallSettings) -> Result<Self> {
        let plan = InstallPlan::resolve(&profile, settings)?;
        Ok(Self { profile, plan })
    }

    /// The profile this installer was created for.
    #[must_use]
    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    /// The resolved plan.
    #[must_use]
    pub fn plan(&self) -> &InstallPlan {
        &self.plan
    }

    /// Runs every step.
    pub fn run(
        &self,
        privilege: &dyn PrivilegeCheck,
        path_store: &mut dyn PathStore,
    ) -> Result<InstallReport> {
        self.run_with(privilege, path_store, |_| {})
    }

    /// Runs every step, calling `on_step` as each one completes.
    pub fn run_with(
        &self,
        privilege: &dyn PrivilegeCheck,
        path_store: &mut dyn PathStore,
        mut on_step: impl FnMut(&StepOutcome),
    ) -> Result<InstallReport> {
        let plan = &self.plan;
        let executable = plan.executable_name;
        let span = tracing::info_span!("install", platform = plan.platform_id);
        let _guard = span.enter();

        let mut steps = Vec::new();
        let mut complete = |step: Step, message: String| {
            let outcome = StepOutcome { step, message };
            on_step(&outcome);
            steps.push(outcome);
        };

        if !privilege.is_elevated() {
            return Err(InstallError::NotElevated {
                executable: executable.to_string(),
            });
        }
        complete(
            Step::Privilege,
            "Running with administrator privileges.".to_string(),
        );

        let build_script = run_build_script(plan)?;
        complete(
            Step::Build,
            format!(
                "Successfully built the project using {}.",
                build_script.display()
            ),
        );

        let normalized_entries = normalize_permissions(&plan.build_output_dir)?;
        complete(
            Step::Permissions,
            format!("Successfully made {executable} executable."),
        );

        let artifact = install_artifact(plan, privilege)?;
        complete(
            Step::Install,
            format!(
                "Successfully installed {executable} to {}.",
                artifact.path.display()
            ),
        );

        let integration = match &plan.link_path {
            Some(link) => {
                let previous = replace_link(link, &artifact.path)?;
                complete(
                    Step::PathIntegration,
                    format!(
                        "Successfully created a symlink to the executable system-wide, \
                         you can now run `{executable}` from anywhere."
                    ),
                );
                set_mode(&artifact.path, FILE_MODE)?;
                complete(
                    Step::PathIntegration,
                    "Successfully set the permissions of the executable files.".to_string(),
                );
                Integration::Linked {
                    link: link.clone(),
                    previous,
                }
            }
            None => {
                let update = add_to_system_path(&plan.install_dir, path_store)?;
                let message = match &update {
                    PathUpdate::Appended(_) => {
                        "Successfully added the target directory to PATH.".to_string()
                    }
                    PathUpdate::AlreadyPresent => {
                        "The target directory is already on PATH.".to_string()
                    }
                };
                complete(Step::PathIntegration, message);
                Integration::SystemPath(update)
            }
        };

        tracing::info!("Installation complete");
        Ok(InstallReport {
            plan: plan.clone(),
            build_script,
            normalized_entries,
            artifact,
            integration,
            steps,
        })
    }
}
