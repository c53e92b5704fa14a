// Flattens the freshly extracted tree. The published archives wrap
// everything in a versioned scaffold folder (for example
// `ffmpeg-7.1-essentials_build/bin/ffmpeg.exe`); this module finds the
// target executable, hoists its grandparent's contents up to the install
// root, and clears away whatever scaffold was there before. Afterwards the
// install root holds `bin/ffmpeg.exe` and its sibling folders directly.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use colored::Colorize;
use walkdir::WalkDir;

use crate::errors::InstallerError;
use crate::{log_debug, log_warn};

/// Searches `install_root` for `exe_name` and flattens that file's
/// grandparent directory up into the root.
///
/// Returns the executable's directory at its new location (the `bin`-like
/// folder now sitting directly under the root), or `None` when the tree
/// contains no such executable. The not-found case deliberately changes
/// nothing on disk; the caller decides how loud to be about it.
pub fn flatten_to_root(
    install_root: &Path,
    exe_name: &str,
) -> Result<Option<PathBuf>, InstallerError> {
    let Some(exe_path) = find_executable(install_root, exe_name) else {
        log_warn!(
            "[Relocate] No {} found under {}",
            exe_name,
            install_root.display()
        );
        return Ok(None);
    };
    log_debug!(
        "[Relocate] Found executable at {}",
        exe_path.display().to_string().cyan()
    );

    let Some(bin_dir) = exe_path.parent() else {
        return Ok(None);
    };
    let bin_name = bin_dir
        .file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    let Some(source_root) = bin_dir.parent().map(Path::to_path_buf) else {
        return Ok(None);
    };

    // Already flat: the executable's folder sits directly under the root.
    // Also never hoist from outside the root, which is where the grandparent
    // lands when the executable sits at the top level itself.
    if source_root.as_path() == install_root || !source_root.starts_with(install_root) {
        log_debug!("[Relocate] Tree is already flat; nothing to move");
        return Ok(Some(bin_dir.to_path_buf()));
    }

    // Everything currently at the top level is extraction scaffold (the
    // downloaded archive and the unpack folder) and goes away once the real
    // contents have been hoisted up.
    let displaced: Vec<PathBuf> = fs::read_dir(install_root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();

    for entry in fs::read_dir(&source_root)? {
        let entry = entry?;
        let target = install_root.join(entry.file_name());
        log_debug!(
            "[Relocate] Moving {} to {}",
            entry.path().display(),
            target.display()
        );
        move_entry(&entry.path(), &target)?;
    }

    for stale in displaced {
        log_debug!("[Relocate] Removing scaffold entry {}", stale.display());
        if stale.is_dir() {
            fs::remove_dir_all(&stale)?;
        } else {
            fs::remove_file(&stale)?;
        }
    }

    Ok(Some(install_root.join(bin_name)))
}

/// First match wins: walks the tree depth-first looking for a file with the
/// given name.
fn find_executable(root: &Path, exe_name: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == OsStr::new(exe_name))
        .map(|entry| entry.into_path())
}

/// Moves a directory entry, falling back to copy-and-delete for files when a
/// plain rename is refused.
fn move_entry(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) if from.is_file() => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Builds the post-extraction shape:
    //   root/ffmpeg-release-essentials.zip        (the downloaded archive)
    //   root/ffmpeg-release-essentials/essentials/bin/ffmpeg.exe
    //   root/ffmpeg-release-essentials/essentials/doc/manual.html
    //   root/ffmpeg-release-essentials/essentials/LICENSE
    fn build_extracted_tree(root: &Path) {
        fs::write(root.join("ffmpeg-release-essentials.zip"), b"archive bytes").unwrap();
        let scaffold = root.join("ffmpeg-release-essentials").join("essentials");
        fs::create_dir_all(scaffold.join("bin")).unwrap();
        fs::create_dir_all(scaffold.join("doc")).unwrap();
        fs::write(scaffold.join("bin").join("ffmpeg.exe"), b"binary").unwrap();
        fs::write(scaffold.join("doc").join("manual.html"), b"<html>").unwrap();
        fs::write(scaffold.join("LICENSE"), b"GPL").unwrap();
    }

    #[test]
    fn flattening_hoists_the_build_and_clears_the_scaffold() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path();
        build_extracted_tree(root);

        let bin_dir = flatten_to_root(root, "ffmpeg.exe")
            .expect("relocation should not fail")
            .expect("executable should be found");

        assert_eq!(bin_dir, root.join("bin"));
        assert!(root.join("bin").join("ffmpeg.exe").is_file());
        assert!(root.join("doc").join("manual.html").is_file());
        assert!(root.join("LICENSE").is_file());
        // The archive and the unpack folder are gone.
        assert!(!root.join("ffmpeg-release-essentials.zip").exists());
        assert!(!root.join("ffmpeg-release-essentials").exists());
    }

    #[test]
    fn missing_executable_changes_nothing() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path();
        fs::create_dir_all(root.join("ffmpeg-release-essentials").join("docs")).unwrap();
        fs::write(root.join("ffmpeg-release-essentials.zip"), b"archive bytes").unwrap();

        let result = flatten_to_root(root, "ffmpeg.exe").expect("no-op should not fail");

        assert!(result.is_none());
        assert!(root.join("ffmpeg-release-essentials.zip").exists());
        assert!(root.join("ffmpeg-release-essentials").join("docs").is_dir());
    }

    #[test]
    fn an_already_flat_tree_is_left_alone() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path();
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("bin").join("ffmpeg.exe"), b"binary").unwrap();
        fs::write(root.join("LICENSE"), b"GPL").unwrap();

        let bin_dir = flatten_to_root(root, "ffmpeg.exe")
            .expect("should not fail")
            .expect("executable is present");

        assert_eq!(bin_dir, root.join("bin"));
        assert!(root.join("bin").join("ffmpeg.exe").is_file());
        assert!(root.join("LICENSE").is_file());
    }

    #[test]
    fn an_executable_at_the_top_level_never_hoists_the_parent_directory() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("FFMPEG");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("ffmpeg.exe"), b"binary").unwrap();
        fs::write(tmp.path().join("unrelated.txt"), b"outside the root").unwrap();

        let bin_dir = flatten_to_root(&root, "ffmpeg.exe")
            .expect("should not fail")
            .expect("executable is present");

        assert_eq!(bin_dir, root);
        assert!(root.join("ffmpeg.exe").is_file());
        assert!(tmp.path().join("unrelated.txt").is_file());
    }

    #[test]
    fn unpacked_tree_without_a_wrapper_folder_still_flattens() {
        // Some archives put bin/ at their top level; the unpack folder itself
        // is then the grandparent and should be dissolved.
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path();
        fs::write(root.join("ffmpeg-git-full.7z"), b"archive bytes").unwrap();
        let unpacked = root.join("ffmpeg-git-full");
        fs::create_dir_all(unpacked.join("bin")).unwrap();
        fs::write(unpacked.join("bin").join("ffmpeg.exe"), b"binary").unwrap();

        let bin_dir = flatten_to_root(root, "ffmpeg.exe")
            .expect("should not fail")
            .expect("executable is present");

        assert_eq!(bin_dir, root.join("bin"));
        assert!(root.join("bin").join("ffmpeg.exe").is_file());
        assert!(!root.join("ffmpeg-git-full").exists());
        assert!(!root.join("ffmpeg-git-full.7z").exists());
    }
}
