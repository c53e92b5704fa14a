// SHA-256 integrity checking for downloaded archives. The expected digest is
// published next to each archive as a small text file; we fetch it, hash the
// file we wrote to disk, and compare.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use colored::Colorize;
use sha2::{Digest, Sha256};

use crate::errors::InstallerError;
use crate::log_debug;

/// Fetches the expected hex digest from the checksum URL.
/// The published file is the bare digest, possibly with trailing whitespace.
pub fn fetch_expected_digest(checksum_url: &str) -> Result<String, InstallerError> {
    log_debug!("[Checksum] Fetching expected digest from {}", checksum_url.blue());
    let response = ureq::get(checksum_url)
        .set("User-Agent", "setup-ffmpeg")
        .call()
        .map_err(|e| InstallerError::Transport(format!("checksum request failed: {e}")))?;
    let body = response
        .into_string()
        .map_err(|e| InstallerError::Transport(format!("checksum response unreadable: {e}")))?;
    Ok(body.trim().to_lowercase())
}

/// Computes the SHA-256 digest of a file, streaming it in 4 KiB chunks so
/// multi-hundred-MB archives never have to fit in memory.
pub fn file_sha256(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 4096];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Verifies that `path` hashes to `expected` (hex, case-insensitive).
pub fn verify_file_digest(path: &Path, expected: &str) -> Result<(), InstallerError> {
    let actual = file_sha256(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(InstallerError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    log_debug!("[Checksum] Digest verified: {}", actual.green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    // SHA-256 of the ASCII bytes "hello world".
    const HELLO_DIGEST: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn digest_of_known_content_matches() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("archive.bin");
        fs::write(&path, b"hello world").expect("write");

        assert_eq!(file_sha256(&path).expect("hash"), HELLO_DIGEST);
        verify_file_digest(&path, HELLO_DIGEST).expect("digest should match");
    }

    #[test]
    fn digest_comparison_ignores_hex_case() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("archive.bin");
        fs::write(&path, b"hello world").expect("write");

        verify_file_digest(&path, &HELLO_DIGEST.to_uppercase()).expect("case-insensitive");
    }

    #[test]
    fn single_byte_mutation_fails_verification() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("archive.bin");
        fs::write(&path, b"hello worlD").expect("write");

        let err = verify_file_digest(&path, HELLO_DIGEST).unwrap_err();
        match err {
            InstallerError::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, HELLO_DIGEST);
                assert_ne!(actual, HELLO_DIGEST);
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }
}
