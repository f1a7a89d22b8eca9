//! Checksum verification for staged archives.
//!
//! The staging file is hashed with SHA-256 in fixed-size chunks and compared,
//! hex-encoded, against the checksum the catalog declares.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::fs::FileSystem;
use super::{Result, VswitchError};

/// Verifies that `file_path` matches the expected SHA-256 checksum.
///
/// The comparison ignores the case of `expected`.
///
/// # Errors
///
/// Returns [`VswitchError::Checksum`] if the file cannot be read and
/// [`VswitchError::ChecksumMismatch`] if the digests differ.
pub fn verify_checksum(fs: &dyn FileSystem, file_path: &Path, expected: &str) -> Result<()> {
    let actual = compute_sha256(fs, file_path)?;
    let expected = expected.to_lowercase();

    if actual != expected {
        return Err(VswitchError::checksum_mismatch(expected, actual));
    }

    Ok(())
}

/// Computes the SHA-256 hash of a file as a lowercase hex string.
///
/// # Errors
///
/// Returns [`VswitchError::Checksum`] if the file cannot be opened or read.
pub fn compute_sha256(fs: &dyn FileSystem, file_path: &Path) -> Result<String> {
    let checksum_error = |source| VswitchError::Checksum {
        path: file_path.to_path_buf(),
        source,
    };

    let mut file = fs.open(file_path).map_err(checksum_error)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(checksum_error)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::fs::OsFileSystem;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    const HELLO_SHA256: &str = "a948904f2f0f479b8f8197694b30184b0d2ed1c1cd2a1ec0fb85d299a192a447";

    #[test]
    fn compute_sha256_produces_correct_hash() {
        let temp = TempDir::new().expect("Should create temp dir");
        let file = temp.child("staged.tar.gz");
        file.write_binary(b"hello world\n").expect("Should write file");

        let hash = compute_sha256(&OsFileSystem, file.path()).expect("Should compute hash");

        assert_eq!(hash, HELLO_SHA256);
    }

    #[test]
    fn verify_checksum_accepts_uppercase_expected() {
        let temp = TempDir::new().expect("Should create temp dir");
        let file = temp.child("staged.tar.gz");
        file.write_binary(b"hello world\n").expect("Should write file");

        let result = verify_checksum(&OsFileSystem, file.path(), &HELLO_SHA256.to_uppercase());

        assert!(result.is_ok());
    }

    #[test]
    fn verify_checksum_reports_both_digests_on_mismatch() {
        let temp = TempDir::new().expect("Should create temp dir");
        let file = temp.child("staged.tar.gz");
        file.write_binary(b"hello world\n").expect("Should write file");

        let result = verify_checksum(&OsFileSystem, file.path(), "deadbeef");

        match result {
            Err(VswitchError::ChecksumMismatch { expected, actual }) => {
                assert_eq!(expected, "deadbeef");
                assert_eq!(actual, HELLO_SHA256);
            }
            other => panic!("Expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn compute_sha256_fails_for_missing_file() {
        let result = compute_sha256(&OsFileSystem, Path::new("/nonexistent/staged.tar.gz"));
        assert!(matches!(result, Err(VswitchError::Checksum { .. })));
    }
}
