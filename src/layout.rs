// Path planning for one install. Given the resolved download URL and the
// base directory the user picked, this module derives every path the rest of
// the pipeline writes to, and prepares the install root on disk.
//
// Planning itself is a pure function over structured `Path` values. The
// extraction destination is the archive destination with its final extension
// removed via `file_stem`, so a filename that happens to contain ".zip"
// somewhere in the middle is stripped correctly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::errors::InstallerError;
use crate::log_debug;

/// The read-only set of paths one install works with. Computed once from the
/// download URL and the base install directory, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// The directory the user asked to install under (e.g. `C:\`).
    pub base_dir: PathBuf,
    /// `base_dir` + the product folder; the final home of the flattened build.
    pub install_root: PathBuf,
    /// Where the downloaded archive lands, inside the install root.
    pub archive_dest: PathBuf,
    /// Where the archive is unpacked: `archive_dest` minus its extension.
    pub unpack_dest: PathBuf,
}

impl InstallLayout {
    /// Derives the full layout. Pure; performs no I/O and cannot fail.
    pub fn plan(url: &str, base_dir: &Path, product_dir: &str) -> Self {
        let install_root = base_dir.join(product_dir);
        let archive_name = url.rsplit('/').next().unwrap_or(url);
        let archive_dest = install_root.join(archive_name);
        let unpack_dest = match archive_dest.file_stem() {
            Some(stem) => archive_dest.with_file_name(stem),
            None => archive_dest.clone(),
        };

        log_debug!(
            "[Layout] install_root={} archive_dest={} unpack_dest={}",
            install_root.display().to_string().cyan(),
            archive_dest.display().to_string().cyan(),
            unpack_dest.display().to_string().cyan()
        );

        InstallLayout {
            base_dir: base_dir.to_path_buf(),
            install_root,
            archive_dest,
            unpack_dest,
        }
    }
}

/// Ensures the install root exists and is empty before anything is written
/// into it.
///
/// A missing directory is created (parents included). An existing empty
/// directory is left untouched. An existing non-empty directory fails with
/// [`InstallerError::InstallRootOccupied`] unless `overwrite` is set, in
/// which case its contents are deleted and the directory recreated. The
/// overwrite path is irreversible, which is why it only ever runs behind the
/// explicit flag.
pub fn prepare_install_root(root: &Path, overwrite: bool) -> Result<(), InstallerError> {
    match fs::read_dir(root) {
        Ok(mut entries) => {
            if entries.next().is_none() {
                log_debug!("[Layout] Install root already exists and is empty; reusing it");
                return Ok(());
            }
            if !overwrite {
                return Err(InstallerError::InstallRootOccupied(root.to_path_buf()));
            }
            log_debug!(
                "[Layout] Overwrite requested; clearing {}",
                root.display().to_string().yellow()
            );
            fs::remove_dir_all(root)?;
            fs::create_dir_all(root)?;
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(root)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const URL: &str = "https://gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip";

    #[test]
    fn planning_is_deterministic() {
        let base = Path::new("C:\\");
        let a = InstallLayout::plan(URL, base, "FFMPEG");
        let b = InstallLayout::plan(URL, base, "FFMPEG");
        assert_eq!(a, b);
    }

    #[test]
    fn planned_paths_nest_under_the_product_folder() {
        let layout = InstallLayout::plan(URL, Path::new("/opt"), "FFMPEG");
        assert_eq!(layout.base_dir, Path::new("/opt"));
        assert_eq!(layout.install_root, Path::new("/opt/FFMPEG"));
        assert_eq!(
            layout.archive_dest,
            Path::new("/opt/FFMPEG/ffmpeg-release-essentials.zip")
        );
        assert_eq!(
            layout.unpack_dest,
            Path::new("/opt/FFMPEG/ffmpeg-release-essentials")
        );
    }

    #[test]
    fn only_the_final_extension_is_stripped() {
        // A name containing the extension token elsewhere must survive intact.
        let layout = InstallLayout::plan(
            "https://example.com/builds/my.zip.backup.zip",
            Path::new("/opt"),
            "FFMPEG",
        );
        assert_eq!(layout.unpack_dest, Path::new("/opt/FFMPEG/my.zip.backup"));
    }

    #[test]
    fn missing_install_root_is_created() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("FFMPEG");
        prepare_install_root(&root, false).expect("should create");
        assert!(root.is_dir());
    }

    #[test]
    fn existing_empty_install_root_is_reused() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("FFMPEG");
        fs::create_dir(&root).expect("mkdir");
        prepare_install_root(&root, false).expect("empty dir is fine");
        assert!(root.is_dir());
    }

    #[test]
    fn occupied_install_root_fails_without_overwrite() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("FFMPEG");
        fs::create_dir(&root).expect("mkdir");
        fs::write(root.join("leftover.txt"), "old install").expect("write");

        let err = prepare_install_root(&root, false).unwrap_err();
        assert!(matches!(err, InstallerError::InstallRootOccupied(_)));
        // And the occupant is untouched.
        assert!(root.join("leftover.txt").exists());
    }

    #[test]
    fn occupied_install_root_is_emptied_with_overwrite() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("FFMPEG");
        fs::create_dir(&root).expect("mkdir");
        fs::write(root.join("leftover.txt"), "old install").expect("write");
        fs::create_dir(root.join("bin")).expect("mkdir bin");

        prepare_install_root(&root, true).expect("overwrite should clear");
        assert!(root.is_dir());
        assert_eq!(fs::read_dir(&root).expect("read").count(), 0);
    }
}
