// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand, ValueEnum};
use codescan::config::ScannerBackend;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "codescan")]
#[command(about = "Barcode and QR code scanner for the terminal")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive scanner (default)
    Terminal,

    /// List available cameras
    List,

    /// Decode a barcode from an image file
    Decode {
        /// Image file to decode
        image: PathBuf,

        /// Decoding backend to use
        #[arg(short, long, value_enum, default_value_t = BackendArg::Classic)]
        backend: BackendArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    /// Classical multi-format decoder (rxing)
    Classic,
    /// Detection-pipeline QR decoder (bardecoder)
    Detector,
}

impl From<BackendArg> for ScannerBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Classic => ScannerBackend::Classic,
            BackendArg::Detector => ScannerBackend::Detector,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=codescan=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Terminal) | None => codescan::terminal::run(),
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Decode { image, backend }) => cli::decode_image(&image, backend.into()),
    }
}
