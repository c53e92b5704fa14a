// Every way the install pipeline can fail, as one typed enum. Each step
// returns `Result<_, InstallerError>` and the first error aborts the steps
// that follow it; `main` prints the message and exits non-zero.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallerError {
    /// No entry in the build catalog matched the requested build/format pair.
    #[error("no FFMPEG build named '{build}' is available as '{format}'")]
    BuildNotFound { build: String, format: String },

    /// A `.7z` build was requested (or resolved) but no `7z` tool is on the PATH.
    #[error("7z archives need the external `7z` tool, which was not found on this system")]
    SevenZipUnavailable,

    /// The install root already holds files and `--overwrite` was not passed.
    #[error("install directory {} exists and is not empty (pass --overwrite to replace it)", .0.display())]
    InstallRootOccupied(PathBuf),

    /// The download itself failed: HTTP error, interrupted stream, or a
    /// downloader command that exited non-zero.
    #[error("download failed: {0}")]
    Transport(String),

    /// The requested external downloader command is not installed.
    #[error("requested downloader `{tool}` was not found on this system")]
    DownloaderMissing { tool: &'static str },

    /// The downloaded archive does not match the published SHA-256 digest.
    /// The file is left on disk so it can be inspected.
    #[error("downloaded file does not match expected hash (expected {expected}, got {actual})")]
    ChecksumMismatch { expected: String, actual: String },

    /// Unpacking the archive failed.
    #[error("archive extraction failed: {0}")]
    Extraction(String),

    /// The archive extracted cleanly but contained no target executable.
    #[error("no `{0}` found anywhere in the extracted archive")]
    ExecutableNotFound(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
