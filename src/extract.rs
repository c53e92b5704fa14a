// Unpacks the downloaded archive into its planned destination, dispatching
// on the archive format the resolver chose. Zip archives are handled
// in-process by the `zip` crate; 7z archives are handed to the external `7z`
// tool that was probed for at startup.

use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};

use colored::Colorize;
use zip::ZipArchive;

use crate::catalog::ArchiveFormat;
use crate::errors::InstallerError;
use crate::log_debug;

/// Decompresses `archive` into `dest`.
///
/// For zip the destination is created as needed and extracted into directly.
/// For 7z the destination must not already exist; it is created fresh and
/// the `7z` tool unpacks into it. Resolution already refused 7z builds when
/// no tool was found, so hitting [`InstallerError::SevenZipUnavailable`]
/// here means a caller skipped that step.
pub fn decompress(
    archive: &Path,
    dest: &Path,
    format: ArchiveFormat,
    seven_zip: Option<&Path>,
) -> Result<(), InstallerError> {
    log_debug!(
        "[Extract] Unpacking {} ({}) into {}",
        archive.display().to_string().blue(),
        format,
        dest.display().to_string().cyan()
    );

    match format {
        ArchiveFormat::Zip => {
            let file = File::open(archive)?;
            let mut zip = ZipArchive::new(file)
                .map_err(|e| InstallerError::Extraction(e.to_string()))?;
            zip.extract(dest)
                .map_err(|e| InstallerError::Extraction(e.to_string()))?;
        }
        ArchiveFormat::SevenZ => {
            let tool = seven_zip.ok_or(InstallerError::SevenZipUnavailable)?;
            // `create_dir` on purpose: the planned unpack destination must
            // be brand new, never a directory with prior contents.
            fs::create_dir(dest)?;
            let output = Command::new(tool)
                .arg("x")
                .arg("-y")
                .arg(format!("-o{}", dest.display()))
                .arg(archive)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(InstallerError::Extraction(format!(
                    "7z exited with {}: {}",
                    output.status,
                    stderr.trim()
                )));
            }
        }
    }

    log_debug!("[Extract] Archive contents available at {:?}", dest);
    Ok(())
}
