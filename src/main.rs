mod catalog;
mod errors;
mod extract;
mod fetch;
mod install;
mod layout;
mod logger;
mod pathenv;
mod relocate;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

use catalog::ArchiveFormat;
use fetch::transport::DownloaderKind;

#[derive(Parser)]
#[command(name = "setup-ffmpeg")]
#[command(about = "Install prebuilt FFMPEG builds with ease", long_about = None)]
pub struct Cli {
    /// The path to install FFMPEG to
    #[arg(long, default_value = "C:\\")]
    pub install_dir: PathBuf,

    /// The build of FFMPEG to install (e.g. release-essentials)
    #[arg(long)]
    pub build: Option<String>,

    /// Preferred archive format
    #[arg(long, value_enum)]
    pub format: Option<ArchiveFormat>,

    /// Replace the contents of an existing install directory
    #[arg(long)]
    pub overwrite: bool,

    /// How to download the archive
    #[arg(long, value_enum, default_value_t = DownloaderKind::Builtin)]
    pub downloader: DownloaderKind,

    /// Turn debugging information on
    #[arg(short, long)]
    pub debug: bool,
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.debug);

    if let Err(err) = install::run(&cli) {
        crate::log_error!("[Install] {err}");
        process::exit(1);
    }
}
