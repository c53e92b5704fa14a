// The install pipeline. Five steps run strictly in order, each one handed
// the immutable configuration and the paths planned up front; the first
// error aborts everything after it.

use colored::Colorize;

use crate::Cli;
use crate::catalog::InstallerConfig;
use crate::errors::InstallerError;
use crate::layout::{self, InstallLayout};
use crate::log_info;
use crate::{extract, fetch, pathenv, relocate};

pub fn run(cli: &Cli) -> Result<(), InstallerError> {
    let config = InstallerConfig::locate();

    // 1. Resolve the requested build/format pair against the catalog.
    let resolved = config.resolve(cli.build.as_deref(), cli.format)?;

    // 2. Plan every path this install touches.
    let layout = InstallLayout::plan(&resolved.url, &cli.install_dir, config.product_dir);

    log_info!(
        "[Install] Making install dir {}",
        layout.install_root.display().to_string().cyan()
    );
    layout::prepare_install_root(&layout.install_root, cli.overwrite)?;

    // 3. Fetch the archive, verifying it against the published digest.
    log_info!(
        "[Install] Downloading {} to {}",
        resolved.url.blue(),
        layout.archive_dest.display().to_string().cyan()
    );
    fetch::download(
        &resolved.url,
        Some(&resolved.checksum_url),
        &layout.archive_dest,
        cli.downloader.transport(),
    )?;

    // 4. Unpack and flatten.
    log_info!(
        "[Install] Unpacking {} to {}",
        layout.archive_dest.display().to_string().cyan(),
        layout.unpack_dest.display().to_string().cyan()
    );
    extract::decompress(
        &layout.archive_dest,
        &layout.unpack_dest,
        resolved.format,
        config.seven_zip.as_deref(),
    )?;

    log_info!(
        "[Install] Moving bin/{} to the top level of {}",
        config.exe_name,
        layout.install_root.display().to_string().cyan()
    );
    let bin_dir = relocate::flatten_to_root(&layout.install_root, config.exe_name)?
        .ok_or_else(|| InstallerError::ExecutableNotFound(config.exe_name.to_string()))?;

    log_info!(
        "[Install] FFMPEG installed to {}",
        layout.install_root.display().to_string().green()
    );

    // 5. Offer to persist bin/ onto the user PATH. Never fatal.
    pathenv::register_bin_dir(&bin_dir);
    Ok(())
}
