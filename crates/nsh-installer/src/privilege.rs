//! Administrative privilege detection.

/// Answers whether the process may write to system locations.
pub trait PrivilegeCheck {
    /// Returns `true` when the process holds administrative/root rights.
    fn is_elevated(&self) -> bool;
}

/// Queries the operating system.
///
/// POSIX: effective user id is 0. Windows: the process token is elevated.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPrivilege;

impl PrivilegeCheck for SystemPrivilege {
    fn is_elevated(&self) -> bool {
        let elevated = is_elevated();
        tracing::debug!(elevated, "Checked process privileges");
        elevated
    }
}

#[cfg(unix)]
fn is_elevated() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(windows)]
#[allow(unsafe_code)]
fn is_elevated() -> bool {
    use std::ffi::c_void;

    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
    use windows_sys::Win32::Security::{
        GetTokenInformation, TOKEN_ELEVATION, TOKEN_QUERY, TokenElevation,
    };
    use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    // SAFETY: the token handle is only used while open and closed exactly once;
    // the output buffer is a properly sized TOKEN_ELEVATION.
    unsafe {
        let mut token: HANDLE = std::ptr::null_mut();
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token) == 0 {
            return false;
        }
        let mut elevation = TOKEN_ELEVATION { TokenIsElevated: 0 };
        let mut returned = 0u32;
        let ok = GetTokenInformation(
            token,
            TokenElevation,
            (&mut elevation as *mut TOKEN_ELEVATION).cast::<c_void>(),
            std::mem::size_of::<TOKEN_ELEVATION>() as u32,
            &mut returned,
        );
        CloseHandle(token);
        ok != 0 && elevation.TokenIsElevated != 0
    }
}

#[cfg(not(any(unix, windows)))]
fn is_elevated() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_matches_effective_uid() {
        let expected = nix::unistd::geteuid().as_raw() == 0;
        assert_eq!(SystemPrivilege.is_elevated(), expected);
    }
}
