//! Build step: run the platform build script.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{InstallError, Result};
use crate::plan::InstallPlan;

/// Exit codes a shell reports when a command could not be executed at all.
const NOT_EXECUTABLE_CODES: [i32; 2] = [126, 127];

/// Runs the build script and waits for it to finish.
///
/// Candidates are tried in order. A candidate that is missing, cannot be
/// spawned or exits with 126/127 hands over to the next one; any other
/// failure is final. The child inherits stdout/stderr so the build's own
/// output reaches the terminal. Returns the script that succeeded.
pub fn run_build_script(plan: &InstallPlan) -> Result<PathBuf> {
    let mut last_error = None;
    for candidate in &plan.script_candidates {
        if !candidate.is_file() {
            tracing::debug!("Build script candidate missing: {}", candidate.display());
            continue;
        }
        match run_script(candidate, &plan.project_root) {
            Ok(()) => return Ok(candidate.clone()),
            Err(e) if could_not_execute(&e) => {
                tracing::warn!("{e}; trying the next build script candidate");
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        let tried = plan
            .script_candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        InstallError::BuildScriptNotFound { tried }
    }))
}

/// Runs a single script with `project_root` as working directory.
pub fn run_script(script: &Path, project_root: &Path) -> Result<()> {
    let script = std::path::absolute(script).unwrap_or_else(|_| script.to_path_buf());
    let mut command = script_command(&script);
    command.current_dir(project_root);

    tracing::info!("Running build script {}", script.display());
    tracing::debug!("exec: {command:?}");

    let status = command.status().map_err(|e| InstallError::BuildSpawn {
        script: script.clone(),
        message: e.to_string(),
    })?;

    if !status.success() {
        return Err(InstallError::BuildFailed {
            script,
            status: status.to_string(),
            code: status.code(),
        });
    }

    tracing::info!("Build finished successfully");
    Ok(())
}

fn could_not_execute(error: &InstallError) -> bool {
    match error {
        InstallError::BuildSpawn { .. } => true,
        InstallError::BuildFailed {
            code: Some(code), ..
        } => NOT_EXECUTABLE_CODES.contains(code),
        _ => false,
    }
}

#[cfg(windows)]
fn script_command(script: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(script);
    command
}

/// Executable scripts run directly so their shebang picks the interpreter;
/// others are handed to `sh`.
#[cfg(unix)]
fn script_command(script: &Path) -> Command {
    use std::os::unix::fs::PermissionsExt;

    let executable = std::fs::metadata(script)
        .is_ok_and(|meta| meta.permissions().mode() & 0o111 != 0);
    if executable {
        Command::new(script)
    } else {
        let mut command = Command::new("sh");
        command.arg(script);
        command
    }
}

#[cfg(not(any(unix, windows)))]
fn script_command(script: &Path) -> Command {
    let mut command = Command::new("sh");
    command.arg(script);
    command
}
