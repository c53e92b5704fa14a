// Persists the installed `bin` directory onto the user's PATH. The change
// itself is made by PowerShell at user scope; this module only builds the
// exact command, shows it, and runs it once the user has explicitly agreed.
// A refusal or a failed PowerShell run never fails the install - by the time
// we are here, FFMPEG is already on disk.

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use colored::Colorize;

use crate::{log_debug, log_info, log_warn};

/// Entries on the user PATH variable are separated with semicolons.
const PATH_SEPARATOR: char = ';';

/// Builds the PowerShell command that appends `bin_dir` to the user-scope
/// PATH, with exactly one separator between the existing value and the new
/// entry.
fn registration_command(current_path: &str, bin_dir: &Path) -> String {
    let mut value = current_path.to_string();
    if !value.is_empty() && !value.ends_with(PATH_SEPARATOR) {
        value.push(PATH_SEPARATOR);
    }
    format!(
        "[Environment]::SetEnvironmentVariable(\"Path\",\"{}{}\",\"User\")",
        value,
        bin_dir.display()
    )
}

/// Case-insensitive yes: `y`, `Y`, `yes`, `YES`, ...
fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Shows the PATH registration command for `bin_dir` and runs it if the user
/// confirms. Execution failures are reported and swallowed.
pub fn register_bin_dir(bin_dir: &Path) {
    let current = env::var("Path")
        .or_else(|_| env::var("PATH"))
        .unwrap_or_default();
    let command = registration_command(&current, bin_dir);

    println!();
    println!();
    println!("{command}");
    println!();
    print!(
        "Would you like to run the above command in PowerShell to add FFMPEG to your PATH? (Y/n) "
    );
    io::stdout().flush().unwrap();

    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();

    if !is_affirmative(&input) {
        log_info!("[PathEnv] Answer was not yes. Command not run.");
        return;
    }

    log_debug!("[PathEnv] Running PowerShell PATH registration");
    match Command::new("powershell").arg("-Command").arg(&command).output() {
        Ok(output) if output.status.success() => {
            log_info!(
                "[PathEnv] Added {} to the user PATH",
                bin_dir.display().to_string().green()
            );
        }
        Ok(output) => {
            log_warn!(
                "[PathEnv] PowerShell reported a failure; PATH was not updated. The install itself is complete."
            );
            let stdout = String::from_utf8_lossy(&output.stdout);
            if !stdout.trim().is_empty() {
                eprintln!("{}", stdout.trim());
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                eprintln!("{}", stderr.trim());
            }
        }
        Err(e) => {
            log_warn!(
                "[PathEnv] Could not launch powershell ({e}); PATH was not updated. The install itself is complete."
            );
        }
    }
}
