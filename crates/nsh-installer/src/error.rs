//! Error types for the installer.

use std::path::PathBuf;

use thiserror::Error;

/// Broad category of an installer failure.
///
/// Every category is terminal: the pipeline stops at the first error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The process lacks administrative rights.
    Privilege,
    /// The build script could not be located or failed.
    Build,
    /// Permission bits on the build output could not be changed.
    Permission,
    /// The artifact could not be placed in the install directory.
    Install,
    /// The symlink or `PATH` entry could not be written.
    PathIntegration,
    /// Settings could not be loaded or resolved.
    Config,
}

impl ErrorKind {
    /// Get a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Privilege => "privilege",
            Self::Build => "build",
            Self::Permission => "permission",
            Self::Install => "install",
            Self::PathIntegration => "path integration",
            Self::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Errors that can occur while installing `nsh`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstallError {
    /// The process does not hold administrative/root privileges.
    #[error("administrator privileges are required to install {executable}")]
    NotElevated {
        /// Name of the executable being installed.
        executable: String,
    },

    /// None of the build script candidates exist.
    #[error("could not find the build script, tried: {tried}")]
    BuildScriptNotFound {
        /// Candidate paths, comma separated.
        tried: String,
    },

    /// The build interpreter could not be started.
    #[error("could not execute the build script {script}: {message}")]
    BuildSpawn {
        /// Script that was being run.
        script: PathBuf,
        /// Underlying I/O error.
        message: String,
    },

    /// The build script exited unsuccessfully.
    #[error("the build script {script} failed with {status}")]
    BuildFailed {
        /// Script that was run.
        script: PathBuf,
        /// Rendered exit status.
        status: String,
        /// Exit code, if the script was not killed by a signal.
        code: Option<i32>,
    },

    /// Setting permission bits on a build output entry failed.
    #[error("could not set permissions on {path}: {message}")]
    Permission {
        /// Entry whose permissions could not be changed.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// Placing the artifact in the install directory failed.
    #[error("could not install {path}: {message}")]
    Installation {
        /// Path that was being read or written.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// The installed copy differs from the build output.
    #[error("installed artifact checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// SHA256 of the build output.
        expected: String,
        /// SHA256 of the installed file.
        actual: String,
    },

    /// Creating the symlink or updating `PATH` failed.
    #[error("could not add {path} to the system path: {message}")]
    PathIntegration {
        /// Link or directory being integrated.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// Settings file could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl InstallError {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotElevated { .. } => ErrorKind::Privilege,
            Self::BuildScriptNotFound { .. } | Self::BuildSpawn { .. } | Self::BuildFailed { .. } => {
                ErrorKind::Build
            }
            Self::Permission { .. } => ErrorKind::Permission,
            Self::Installation { .. } | Self::ChecksumMismatch { .. } => ErrorKind::Install,
            Self::PathIntegration { .. } => ErrorKind::PathIntegration,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns a short directive for the operator, when one applies.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self.kind() {
            ErrorKind::Privilege if cfg!(windows) => {
                Some("Run the installer from an administrator prompt.")
            }
            ErrorKind::Privilege => Some("Run the installer with sudo."),
            ErrorKind::PathIntegration => Some("Try running the installer as an administrator."),
            ErrorKind::Build => Some("Run the installer from the project root."),
            ErrorKind::Permission | ErrorKind::Install | ErrorKind::Config => None,
        }
    }

    /// Returns a user-friendly error message suitable for the terminal.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self.kind() {
            ErrorKind::Privilege => "This installer must be run with administrator privileges.",
            ErrorKind::Build => "Could not find or execute the build script.",
            ErrorKind::Permission => "Could not make the build output executable.",
            ErrorKind::Install => "Could not install the executable.",
            ErrorKind::PathIntegration => "Could not add the executable to the system path.",
            ErrorKind::Config => "Could not load the installer settings.",
        }
    }
}

impl From<serde_json::Error> for InstallError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for installer operations.
pub type Result<T> = std::result::Result<T, InstallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = InstallError::NotElevated {
            executable: "nsh".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Privilege);

        let err = InstallError::BuildFailed {
            script: PathBuf::from("build/build.sh"),
            status: "exit status: 2".to_string(),
            code: Some(2),
        };
        assert_eq!(err.kind(), ErrorKind::Build);

        let err = InstallError::ChecksumMismatch {
            expected: "a".to_string(),
            actual: "b".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Install);
    }

    #[test]
    fn test_user_messages() {
        let err = InstallError::PathIntegration {
            path: PathBuf::from("/usr/local/bin/nsh"),
            message: "permission denied".to_string(),
        };
        assert!(err.user_message().contains("system path"));
        assert!(err.hint().is_some_and(|h| h.contains("administrator")));
        assert!(err.to_string().contains("/usr/local/bin/nsh"));
    }

    #[test]
    fn test_install_errors_have_no_hint() {
        let err = InstallError::Installation {
            path: PathBuf::from("/usr/local/bin/theHamdiz"),
            message: "disk full".to_string(),
        };
        assert!(err.hint().is_none());
    }
}
