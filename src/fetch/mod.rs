//! # Archive Fetcher
//!
//! Moves the resolved archive from its URL onto disk and proves the bytes
//! are the ones the publisher signed off on.
//!
//! The transfer itself runs on one background thread so the controlling flow
//! can keep the user informed. The flow here is:
//!
//! 1. **Digest prefetch** - the published SHA-256 is fetched before the
//!    transfer starts, so a dead checksum endpoint fails fast.
//! 2. **Size query** - a HEAD request reads the advertised `Content-Length`;
//!    progress lines are printed against that total.
//! 3. **Transfer** - the selected [`transport::Transport`] writes the bytes;
//!    the worker thread then verifies the digest and returns one combined
//!    `Result` through its join handle.
//! 4. **Polling** - after a short settling delay the controlling flow checks
//!    the worker every five seconds and prints cumulative progress. The
//!    final progress line is printed only after the worker is confirmed
//!    finished, so on success it always shows the full total.
//!
//! Ctrl-C during the transfer removes the partially written archive before
//! the process exits with status 1. A checksum mismatch, by contrast, leaves
//! the file in place so it can be inspected.

pub mod checksum;
pub mod transport;

use std::fs;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use colored::Colorize;

use crate::errors::InstallerError;
use crate::{log_debug, log_info, log_warn};

use self::transport::Transport;

/// How often the controlling flow re-checks the worker and reports progress.
const POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Grace period before the first liveness check, matching the original
/// cadence of the tool: the worker gets a moment to open the connection
/// before anyone asks how it is doing.
const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Downloads `url` into `dest` with the given transport, verifying the
/// digest published at `checksum_url` when one is supplied.
pub fn download(
    url: &str,
    checksum_url: Option<&str>,
    dest: &Path,
    transport: Box<dyn Transport>,
) -> Result<(), InstallerError> {
    let expected_digest = match checksum_url {
        Some(checksum_url) => Some(checksum::fetch_expected_digest(checksum_url)?),
        None => None,
    };

    let total = remote_content_length(url);
    let armed = arm_interrupt_cleanup(dest);
    let result = run_transfer(url, dest, expected_digest, total, transport);
    // The archive is complete (or the failure is final); a late Ctrl-C must
    // not delete it any more.
    armed.store(false, Ordering::SeqCst);
    result
}

/// Runs the transfer on a background thread and polls it to completion.
/// Split out from [`download`] so it can be exercised without a network.
fn run_transfer(
    url: &str,
    dest: &Path,
    expected_digest: Option<String>,
    total: u64,
    transport: Box<dyn Transport>,
) -> Result<(), InstallerError> {
    let transferred = Arc::new(AtomicU64::new(0));
    let transport_counts = transport.counts_bytes();
    log_debug!(
        "[Fetch] Using the {} transport (tracks its own bytes: {})",
        transport.name().magenta(),
        transport_counts
    );

    let worker = {
        let url = url.to_string();
        let dest = dest.to_path_buf();
        let transferred = Arc::clone(&transferred);
        thread::spawn(move || -> Result<(), InstallerError> {
            transport.transfer(&url, &dest, &transferred)?;
            if let Some(expected) = expected_digest {
                checksum::verify_file_digest(&dest, &expected)?;
            }
            Ok(())
        })
    };

    thread::sleep(SETTLE_DELAY);
    let mut reported: u64 = 0;
    while !worker.is_finished() {
        thread::sleep(POLL_INTERVAL);
        // Progress only ever moves forward, even if the on-disk size briefly
        // reads behind a previous observation.
        reported = reported.max(observed_bytes(transport_counts, &transferred, dest));
        print_progress(reported, total);
    }

    // The worker is done; one last read so the final line reflects the true
    // byte count on success.
    reported = reported.max(observed_bytes(transport_counts, &transferred, dest));
    print_progress(reported, total);

    match worker.join() {
        Ok(result) => result,
        Err(_) => Err(InstallerError::Transport(
            "download worker panicked".to_string(),
        )),
    }
}

/// Current transfer progress: the shared byte counter when the transport
/// maintains one, otherwise the size of whatever the external tool has
/// written to disk so far.
fn observed_bytes(transport_counts: bool, transferred: &AtomicU64, dest: &Path) -> u64 {
    if transport_counts {
        transferred.load(Ordering::Relaxed)
    } else {
        fs::metadata(dest).map(|m| m.len()).unwrap_or(0)
    }
}

fn print_progress(bytes: u64, total: u64) {
    if total > 0 {
        log_info!("[Fetch] Progress: {:.2}MB / {:.2}MB", as_mb(bytes), as_mb(total));
    } else {
        log_info!("[Fetch] Progress: {:.2}MB", as_mb(bytes));
    }
}

fn as_mb(bytes: u64) -> f64 {
    bytes as f64 / 1_000_000.0
}

/// Asks the server for the archive size before the transfer begins. A server
/// that does not advertise one just means progress prints without a total.
fn remote_content_length(url: &str) -> u64 {
    match ureq::head(url).set("User-Agent", "setup-ffmpeg").call() {
        Ok(response) => response
            .header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        Err(e) => {
            log_warn!("[Fetch] Could not query archive size up front: {e}");
            0
        }
    }
}

/// Registers a Ctrl-C handler that removes the partial download before the
/// process terminates with status 1. The returned flag disarms the cleanup
/// once the transfer has fully settled.
fn arm_interrupt_cleanup(dest: &Path) -> Arc<AtomicBool> {
    let armed = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&armed);
    let partial = dest.to_path_buf();
    if let Err(e) = ctrlc::set_handler(move || {
        if flag.load(Ordering::SeqCst) {
            let _ = fs::remove_file(&partial);
            eprintln!();
            eprintln!("Download interrupted; removed partial file {}", partial.display());
        }
        process::exit(1);
    }) {
        log_warn!("[Fetch] Could not register interrupt handler: {e}");
    }
    armed
}
