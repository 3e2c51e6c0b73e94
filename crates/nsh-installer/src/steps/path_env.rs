//! Windows path integration: append the install directory to `PATH`.
//!
//! The string handling is platform independent so it can be exercised
//! anywhere; only [`SystemPathStore`] touches the real machine environment.

use std::path::Path;
use std::process::Command;

use crate::error::{InstallError, Result};

/// Separator between `PATH` entries on Windows.
pub const PATH_SEPARATOR: char = ';';

/// Longest value `setx` stores without truncating it.
pub const SETX_MAX_LEN: usize = 1024;

/// Registry key holding the machine-wide environment.
pub const MACHINE_ENVIRONMENT_KEY: &str =
    r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

/// Source and sink for the persisted `PATH` value.
pub trait PathStore {
    /// Reads the current persisted `PATH` value.
    fn read(&self) -> Result<String>;

    /// Persists a new `PATH` value.
    fn persist(&mut self, value: &str) -> Result<()>;

    /// Longest value [`PathStore::persist`] can store intact, if limited.
    fn max_len(&self) -> Option<usize> {
        None
    }
}

/// Reads the machine `Path` from the registry and persists it machine-wide
/// with `setx /M`, which requires an elevated prompt.
///
/// The process `PATH` is never used: it merges user and machine entries and
/// has `%VAR%` references already expanded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPathStore;

fn path_error(message: String) -> InstallError {
    InstallError::PathIntegration {
        path: "PATH".into(),
        message,
    }
}

impl PathStore for SystemPathStore {
    fn read(&self) -> Result<String> {
        read_machine_path()
    }

    fn persist(&mut self, value: &str) -> Result<()> {
        let output = Command::new("setx")
            .args(["/M", "PATH", value])
            .output()
            .map_err(|e| path_error(format!("failed to run setx: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(path_error(format!(
                "setx failed with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn max_len(&self) -> Option<usize> {
        Some(SETX_MAX_LEN)
    }
}

#[cfg(windows)]
#[allow(unsafe_code)]
fn read_machine_path() -> Result<String> {
    use windows_sys::Win32::Foundation::ERROR_SUCCESS;
    use windows_sys::Win32::System::Registry::{
        HKEY_LOCAL_MACHINE, RRF_NOEXPAND, RRF_RT_REG_EXPAND_SZ, RRF_RT_REG_SZ, RegGetValueW,
    };

    fn wide(value: &str) -> Vec<u16> {
        value.encode_utf16().chain(std::iter::once(0)).collect()
    }

    let subkey = wide(MACHINE_ENVIRONMENT_KEY);
    let name = wide("Path");
    let flags = RRF_RT_REG_SZ | RRF_RT_REG_EXPAND_SZ | RRF_NOEXPAND;

    let mut size = 0u32;
    // SAFETY: both strings are NUL-terminated; a null data pointer only
    // queries the value size in bytes.
    let status = unsafe {
        RegGetValueW(
            HKEY_LOCAL_MACHINE,
            subkey.as_ptr(),
            name.as_ptr(),
            flags,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            &mut size,
        )
    };
    if status != ERROR_SUCCESS {
        return Err(path_error(format!(
            "failed to query the machine Path (error {status})"
        )));
    }

    let mut buffer = vec![0u16; (size as usize).div_ceil(2)];
    // SAFETY: `buffer` holds at least `size` bytes.
    let status = unsafe {
        RegGetValueW(
            HKEY_LOCAL_MACHINE,
            subkey.as_ptr(),
            name.as_ptr(),
            flags,
            std::ptr::null_mut(),
            buffer.as_mut_ptr().cast(),
            &mut size,
        )
    };
    if status != ERROR_SUCCESS {
        return Err(path_error(format!(
            "failed to read the machine Path (error {status})"
        )));
    }

    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16(&buffer[..len])
        .map_err(|e| path_error(format!("machine Path is not valid UTF-16: {e}")))
}

#[cfg(not(windows))]
fn read_machine_path() -> Result<String> {
    Err(path_error(
        "the machine PATH is only persisted on Windows".to_string(),
    ))
}

/// Outcome of a `PATH` update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathUpdate {
    /// The directory was already on `PATH`; nothing was written.
    AlreadyPresent,
    /// The directory was appended; holds the persisted value.
    Appended(String),
}

/// Returns the new `PATH` value, or `None` if `dir` is already contained.
///
/// Containment is a plain substring test, matching how the value has always
/// been checked.
#[must_use]
pub fn append_path_entry(current: &str, dir: &str) -> Option<String> {
    if current.contains(dir) {
        return None;
    }
    let trimmed = current.trim_end_matches(PATH_SEPARATOR);
    if trimmed.is_empty() {
        Some(dir.to_string())
    } else {
        Some(format!("{trimmed}{PATH_SEPARATOR}{dir}"))
    }
}

/// Adds `install_dir` (never the executable itself) to the persisted `PATH`.
pub fn add_to_system_path(install_dir: &Path, store: &mut dyn PathStore) -> Result<PathUpdate> {
    let absolute = std::path::absolute(install_dir).map_err(|e| InstallError::PathIntegration {
        path: install_dir.to_path_buf(),
        message: format!("failed to resolve absolute path: {e}"),
    })?;
    let dir = absolute.display().to_string();

    let current = store.read()?;
    if current.trim_matches(PATH_SEPARATOR).trim().is_empty() {
        return Err(path_error(
            "refusing to overwrite an empty machine PATH".to_string(),
        ));
    }

    match append_path_entry(&current, &dir) {
        None => {
            tracing::info!("{} is already on PATH", dir);
            Ok(PathUpdate::AlreadyPresent)
        }
        Some(updated) => {
            let length = updated.chars().count();
            if let Some(max) = store.max_len().filter(|max| length > *max) {
                return Err(path_error(format!(
                    "the new PATH would be {length} characters, more than the {max} that can be stored"
                )));
            }
            tracing::info!("Appending {} to PATH", dir);
            store.persist(&updated)?;
            Ok(PathUpdate::Appended(updated))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        value: String,
        writes: Vec<String>,
    }

    impl PathStore for MemoryStore {
        fn read(&self) -> Result<String> {
            Ok(self.value.clone())
        }

        fn persist(&mut self, value: &str) -> Result<()> {
            self.writes.push(value.to_string());
            self.value = value.to_string();
            Ok(())
        }
    }

    /// Fails every read and counts persist calls.
    #[derive(Default)]
    struct UnreadableStore {
        writes: usize,
    }

    impl PathStore for UnreadableStore {
        fn read(&self) -> Result<String> {
            Err(InstallError::PathIntegration {
                path: "PATH".into(),
                message: "registry value missing".to_string(),
            })
        }

        fn persist(&mut self, _value: &str) -> Result<()> {
            self.writes += 1;
            Ok(())
        }
    }

    struct LimitedStore {
        inner: MemoryStore,
        max: usize,
    }

    impl PathStore for LimitedStore {
        fn read(&self) -> Result<String> {
            self.inner.read()
        }

        fn persist(&mut self, value: &str) -> Result<()> {
            self.inner.persist(value)
        }

        fn max_len(&self) -> Option<usize> {
            Some(self.max)
        }
    }

    struct FailingStore;

    impl PathStore for FailingStore {
        fn read(&self) -> Result<String> {
            Ok(r"C:\Windows".to_string())
        }

        fn persist(&mut self, _value: &str) -> Result<()> {
            Err(InstallError::PathIntegration {
                path: "PATH".into(),
                message: "access denied".to_string(),
            })
        }
    }

    #[test]
    fn test_append_entry() {
        assert_eq!(
            append_path_entry(r"C:\Windows", r"C:\Program Files\theHamdiz"),
            Some(r"C:\Windows;C:\Program Files\theHamdiz".to_string())
        );
    }

    #[test]
    fn test_append_trims_trailing_separator() {
        assert_eq!(
            append_path_entry(r"C:\Windows;", r"C:\tools"),
            Some(r"C:\Windows;C:\tools".to_string())
        );
        assert_eq!(append_path_entry("", r"C:\tools"), Some(r"C:\tools".to_string()));
    }

    #[test]
    fn test_existing_entry_not_duplicated() {
        let current = r"C:\Windows;C:\Program Files\theHamdiz;C:\bin";
        assert_eq!(
            append_path_entry(current, r"C:\Program Files\theHamdiz"),
            None
        );
    }

    #[test]
    fn test_store_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let install_dir = dir.path().join("theHamdiz");
        let mut store = MemoryStore {
            value: "existing".to_string(),
            ..Default::default()
        };

        let first = add_to_system_path(&install_dir, &mut store).unwrap();
        let second = add_to_system_path(&install_dir, &mut store).unwrap();

        assert!(matches!(first, PathUpdate::Appended(_)));
        assert_eq!(second, PathUpdate::AlreadyPresent);
        assert_eq!(store.writes.len(), 1);
        assert!(store.value.ends_with(&install_dir.display().to_string()));
        assert!(!store.value.ends_with("nsh.exe"));
    }

    #[test]
    fn test_persist_failure_propagates() {
        let result = add_to_system_path(Path::new("theHamdiz"), &mut FailingStore);
        assert!(matches!(result, Err(InstallError::PathIntegration { .. })));
    }

    #[test]
    fn test_read_failure_never_persists() {
        let mut store = UnreadableStore::default();

        let result = add_to_system_path(Path::new("theHamdiz"), &mut store);
        assert!(matches!(result, Err(InstallError::PathIntegration { .. })));
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_empty_path_is_not_overwritten() {
        for current in ["", ";", "  "] {
            let mut store = MemoryStore {
                value: current.to_string(),
                ..Default::default()
            };

            let result = add_to_system_path(Path::new("theHamdiz"), &mut store);
            assert!(result.is_err(), "persisted over {current:?}");
            assert!(store.writes.is_empty());
        }
    }

    #[test]
    fn test_refuses_value_longer_than_store_limit() {
        let mut store = LimitedStore {
            inner: MemoryStore {
                value: "x".repeat(30),
                ..Default::default()
            },
            max: 32,
        };

        let result = add_to_system_path(Path::new("theHamdiz"), &mut store);
        assert!(matches!(result, Err(InstallError::PathIntegration { .. })));
        assert!(store.inner.writes.is_empty());
        assert_eq!(store.inner.value, "x".repeat(30));
    }

    #[test]
    fn test_system_store_limit_matches_setx() {
        assert_eq!(SystemPathStore.max_len(), Some(SETX_MAX_LEN));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_system_store_read_fails_off_windows() {
        assert!(matches!(
            SystemPathStore.read(),
            Err(InstallError::PathIntegration { .. })
        ));
    }
}
