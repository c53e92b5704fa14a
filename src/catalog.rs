// This module owns the fixed catalog of FFMPEG builds published at gyan.dev
// and resolves a requested (build, format) pair into the concrete download
// URL plus its companion checksum URL. The catalog is baked into the
// `InstallerConfig` value constructed once in `main` and handed to every
// pipeline step; nothing here is mutated after startup.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use colored::Colorize;

use crate::errors::InstallerError;
use crate::{log_debug, log_warn};

/// The two archive formats the FFMPEG builds are published in.
///
/// Zip archives are handled in-process by the `zip` crate. 7z archives need
/// the external `7z` tool, which may or may not be installed, so everything
/// 7z-related is treated as an optional capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArchiveFormat {
    Zip,
    #[value(name = "7z")]
    SevenZ,
}

impl ArchiveFormat {
    /// The file extension this format uses in the published archive names.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::SevenZ => "7z",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One known build/format combination the resolver can serve.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub build: &'static str,
    pub format: ArchiveFormat,
}

// The builds gyan.dev publishes, in the order we prefer them when the user
// leaves `--build` or `--format` unspecified.
const FFMPEG_BUILDS: &[CatalogEntry] = &[
    CatalogEntry { build: "release-full", format: ArchiveFormat::SevenZ },
    CatalogEntry { build: "release-full-shared", format: ArchiveFormat::SevenZ },
    CatalogEntry { build: "release-essentials", format: ArchiveFormat::Zip },
    CatalogEntry { build: "release-essentials", format: ArchiveFormat::SevenZ },
    CatalogEntry { build: "git-essentials", format: ArchiveFormat::SevenZ },
    CatalogEntry { build: "git-full", format: ArchiveFormat::SevenZ },
];

const BASE_URL: &str = "https://gyan.dev/ffmpeg/builds/ffmpeg-";
const CHECKSUM_SUFFIX: &str = ".sha256";

/// A resolved download: the archive URL, the URL of its published SHA-256
/// digest, and the archive format the extractor will have to deal with.
#[derive(Debug, Clone)]
pub struct ResolvedDownload {
    pub url: String,
    pub checksum_url: String,
    pub format: ArchiveFormat,
}

/// Immutable installer configuration, built once at startup and passed
/// explicitly into each pipeline step.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    pub catalog: &'static [CatalogEntry],
    pub base_url: &'static str,
    pub checksum_suffix: &'static str,
    /// Name of the folder created under the chosen install directory.
    pub product_dir: &'static str,
    /// The executable the relocation step searches the extracted tree for.
    pub exe_name: &'static str,
    /// Path of the `7z` tool if one was found on the PATH at startup.
    pub seven_zip: Option<PathBuf>,
}

impl InstallerConfig {
    /// Builds the configuration, probing the PATH for the optional `7z` tool.
    pub fn locate() -> Self {
        let seven_zip = which::which("7z").ok();
        match &seven_zip {
            Some(path) => log_debug!(
                "[Catalog] Found 7z tool at {}",
                path.display().to_string().cyan()
            ),
            None => log_warn!("[Catalog] No `7z` tool on PATH; only zip builds can be installed"),
        }
        Self::with_seven_zip(seven_zip)
    }

    /// Same as [`InstallerConfig::locate`] but with the capability decided by
    /// the caller. Tests use this to simulate both environments.
    pub fn with_seven_zip(seven_zip: Option<PathBuf>) -> Self {
        InstallerConfig {
            catalog: FFMPEG_BUILDS,
            base_url: BASE_URL,
            checksum_suffix: CHECKSUM_SUFFIX,
            product_dir: "FFMPEG",
            exe_name: "ffmpeg.exe",
            seven_zip,
        }
    }

    /// Resolves the first catalog entry matching the given filters into a
    /// download URL. A `None` filter matches any entry.
    ///
    /// Resolution is the single place where the 7z capability is checked: a
    /// matching `.7z` entry with no `7z` tool available fails here with
    /// [`InstallerError::SevenZipUnavailable`], so the extractor can rely on
    /// the capability being present for whatever URL this returns.
    pub fn resolve(
        &self,
        build: Option<&str>,
        format: Option<ArchiveFormat>,
    ) -> Result<ResolvedDownload, InstallerError> {
        for entry in self.catalog {
            if build.is_some_and(|b| b != entry.build) {
                continue;
            }
            if format.is_some_and(|f| f != entry.format) {
                continue;
            }

            if entry.format == ArchiveFormat::SevenZ && self.seven_zip.is_none() {
                return Err(InstallerError::SevenZipUnavailable);
            }

            let url = format!("{}{}.{}", self.base_url, entry.build, entry.format.extension());
            log_debug!("[Catalog] Resolved download URL: {}", url.blue());
            return Ok(ResolvedDownload {
                checksum_url: format!("{url}{}", self.checksum_suffix),
                url,
                format: entry.format,
            });
        }

        Err(InstallerError::BuildNotFound {
            build: build.unwrap_or("any").to_string(),
            format: format.map_or_else(|| "any".to_string(), |f| f.to_string()),
        })
    }
}
