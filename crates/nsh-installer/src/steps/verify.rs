//! SHA256 verification of the installed artifact.

use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{InstallError, Result};

/// Computes the SHA256 hash of a file as lowercase hex.
pub fn compute_file_sha256(path: &Path) -> Result<String> {
    let to_error = |e: io::Error| InstallError::Installation {
        path: path.to_path_buf(),
        message: format!("failed to hash file: {e}"),
    };
    let mut file = File::open(path).map_err(to_error)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(to_error)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Verifies that `installed` has the same content as `source`.
///
/// Returns the verified SHA256 hash on success.
pub fn verify_copy(source: &Path, installed: &Path) -> Result<String> {
    let expected = compute_file_sha256(source)?;
    let actual = compute_file_sha256(installed)?;

    if actual != expected {
        return Err(InstallError::ChecksumMismatch { expected, actual });
    }

    tracing::info!("SHA256 verification passed: {}", actual);
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_file_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, b"Hello, World!").unwrap();

        assert_eq!(
            compute_file_sha256(&path).unwrap(),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[test]
    fn test_verify_copy_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, b"one").unwrap();
        std::fs::write(&b, b"two").unwrap();

        let result = verify_copy(&a, &b);
        assert!(matches!(result, Err(InstallError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_verify_copy_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        std::fs::write(&a, b"one").unwrap();

        let result = verify_copy(&a, &dir.path().join("missing"));
        assert!(matches!(result, Err(InstallError::Installation { .. })));
    }
}
