// The interchangeable download strategies. Each one does exactly one thing:
// move the bytes at a URL into a destination file. The built-in strategy
// streams through `ureq`; the rest shell out to a well-known download tool,
// failing up front with the tool's name if it is not installed. Whichever
// strategy runs, the destination file must end up byte-identical.

use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use clap::ValueEnum;
use colored::Colorize;

use crate::errors::InstallerError;
use crate::log_debug;

/// One download strategy: transfer the bytes at `url` into the file at
/// `dest`. Implementations that stream the bytes themselves keep
/// `transferred` up to date; the ones that delegate to an external process
/// cannot, and say so via [`Transport::counts_bytes`] so the caller knows to
/// watch the destination file instead.
pub trait Transport: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> &'static str;

    /// Whether this transport updates `transferred` itself.
    fn counts_bytes(&self) -> bool {
        false
    }

    fn transfer(
        &self,
        url: &str,
        dest: &Path,
        transferred: &AtomicU64,
    ) -> Result<(), InstallerError>;
}

/// The downloader selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DownloaderKind {
    /// Stream with the built-in HTTP client.
    Builtin,
    /// Delegate to `powershell Invoke-WebRequest`.
    Powershell,
    /// Delegate to `curl`.
    Curl,
    /// Delegate to `wget`.
    Wget,
}

impl DownloaderKind {
    pub fn transport(self) -> Box<dyn Transport> {
        match self {
            DownloaderKind::Builtin => Box::new(BuiltinTransport),
            DownloaderKind::Powershell => Box::new(PowerShellTransport),
            DownloaderKind::Curl => Box::new(CurlTransport),
            DownloaderKind::Wget => Box::new(WgetTransport),
        }
    }
}

impl fmt::Display for DownloaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DownloaderKind::Builtin => "builtin",
            DownloaderKind::Powershell => "powershell",
            DownloaderKind::Curl => "curl",
            DownloaderKind::Wget => "wget",
        };
        f.write_str(name)
    }
}

/// Streams the response body straight to disk with `ureq`, counting bytes as
/// they arrive.
pub struct BuiltinTransport;

impl Transport for BuiltinTransport {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn counts_bytes(&self) -> bool {
        true
    }

    fn transfer(
        &self,
        url: &str,
        dest: &Path,
        transferred: &AtomicU64,
    ) -> Result<(), InstallerError> {
        let response = ureq::get(url)
            .set("User-Agent", "setup-ffmpeg")
            .call()
            .map_err(|e| InstallerError::Transport(format!("HTTP request failed: {e}")))?;

        let mut reader = response.into_reader();
        let mut file = File::create(dest)?;
        let mut buf = [0u8; 4096];
        loop {
            let read = reader
                .read(&mut buf)
                .map_err(|e| InstallerError::Transport(format!("connection interrupted: {e}")))?;
            if read == 0 {
                break;
            }
            file.write_all(&buf[..read])?;
            transferred.fetch_add(read as u64, Ordering::Relaxed);
        }
        Ok(())
    }
}

/// Locates an external download tool on the PATH, or fails naming it so the
/// user knows exactly what to install.
fn locate_tool(tool: &'static str) -> Result<PathBuf, InstallerError> {
    which::which(tool).map_err(|_| InstallerError::DownloaderMissing { tool })
}

/// Runs a fully-argued download command, mapping a non-zero exit into a
/// transport error carrying the tool's stderr.
fn run_download_command(mut command: Command, tool: &str) -> Result<(), InstallerError> {
    log_debug!("[Fetch] Spawning downloader: {:?}", command);
    let output = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(InstallerError::Transport(format!(
            "{tool} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// The PowerShell command line that mirrors what the built-in client does.
fn invoke_webrequest_command(url: &str, dest: &Path) -> String {
    format!(
        "Invoke-WebRequest -Uri \"{url}\" -OutFile \"{}\"",
        dest.display()
    )
}

/// Downloads through `powershell Invoke-WebRequest`.
pub struct PowerShellTransport;

impl Transport for PowerShellTransport {
    fn name(&self) -> &'static str {
        "powershell"
    }

    fn transfer(&self, url: &str, dest: &Path, _: &AtomicU64) -> Result<(), InstallerError> {
        let powershell = locate_tool("powershell")?;
        let mut command = Command::new(powershell);
        command
            .arg("-NoProfile")
            .arg("-Command")
            .arg(invoke_webrequest_command(url, dest));
        run_download_command(command, "powershell")
    }
}

/// Downloads through `curl`.
pub struct CurlTransport;

impl Transport for CurlTransport {
    fn name(&self) -> &'static str {
        "curl"
    }

    fn transfer(&self, url: &str, dest: &Path, _: &AtomicU64) -> Result<(), InstallerError> {
        let curl = locate_tool("curl")?;
        let mut command = Command::new(curl);
        command
            .arg("-L")
            .arg("-sS")
            .arg("--fail")
            .arg("-o")
            .arg(dest)
            .arg(url);
        run_download_command(command, "curl")
    }
}

/// Downloads through `wget`.
pub struct WgetTransport;

impl Transport for WgetTransport {
    fn name(&self) -> &'static str {
        "wget"
    }

    fn transfer(&self, url: &str, dest: &Path, _: &AtomicU64) -> Result<(), InstallerError> {
        let wget = locate_tool("wget")?;
        let mut command = Command::new(wget);
        command.arg("-q").arg("-O").arg(dest).arg(url);
        run_download_command(command, "wget")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_maps_to_a_transport_with_a_matching_name() {
        for kind in [
            DownloaderKind::Builtin,
            DownloaderKind::Powershell,
            DownloaderKind::Curl,
            DownloaderKind::Wget,
        ] {
            assert_eq!(kind.transport().name(), kind.to_string());
        }
    }

    #[test]
    fn only_the_builtin_transport_counts_its_own_bytes() {
        assert!(DownloaderKind::Builtin.transport().counts_bytes());
        assert!(!DownloaderKind::Curl.transport().counts_bytes());
        assert!(!DownloaderKind::Wget.transport().counts_bytes());
        assert!(!DownloaderKind::Powershell.transport().counts_bytes());
    }

    #[test]
    fn invoke_webrequest_quotes_both_operands() {
        let cmd = invoke_webrequest_command(
            "https://gyan.dev/ffmpeg/builds/ffmpeg-release-essentials.zip",
            Path::new("C:\\FFMPEG\\ffmpeg-release-essentials.zip"),
        );
        assert!(cmd.starts_with("Invoke-WebRequest -Uri \"https://"));
        assert!(cmd.ends_with("-OutFile \"C:\\FFMPEG\\ffmpeg-release-essentials.zip\""));
    }
}
