//! SerumPreset CLI
//!
//! Unpacks `.SerumPreset` files to JSON and packs them back.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use serum_preset::{files, ContainerReader, ConvertConfig, Direction};

#[derive(Parser)]
#[command(name = "serum-preset")]
#[command(about = "Convert Xfer Serum presets to JSON and back", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unpack a .SerumPreset file into a JSON document
    Unpack {
        src: PathBuf,
        dst: PathBuf,
        /// Write compact JSON instead of indented
        #[arg(long)]
        compact: bool,
    },
    /// Pack a JSON document into a .SerumPreset file
    Pack {
        src: PathBuf,
        dst: PathBuf,
        /// Zstd compression level (default 3)
        #[arg(short, long)]
        level: Option<i32>,
    },
    /// Show the section layout of a .SerumPreset file
    Info { src: PathBuf },
    /// Convert every matching file in a folder
    Batch {
        #[arg(value_enum)]
        direction: BatchDirection,
        dir: PathBuf,
        /// Output directory (default: <DIR>/.tmp)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Continue with remaining files after a failure
        #[arg(long)]
        continue_on_error: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BatchDirection {
    Unpack,
    Pack,
}

impl From<BatchDirection> for Direction {
    fn from(direction: BatchDirection) -> Self {
        match direction {
            BatchDirection::Unpack => Direction::Unpack,
            BatchDirection::Pack => Direction::Pack,
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Commands) -> Result<()> {
    let mut config = ConvertConfig::from_env();

    match command {
        Commands::Unpack { src, dst, compact } => {
            if compact {
                config.pretty_json = false;
            }
            files::unpack_file(&src, &dst, &config)
                .with_context(|| format!("Failed to unpack {}", src.display()))?;
            info!(output = %dst.display(), "Written");
        }
        Commands::Pack { src, dst, level } => {
            if let Some(level) = level {
                config.compression_level = level;
            }
            config.validate().map_err(anyhow::Error::msg)?;
            files::pack_file(&src, &dst, &config)
                .with_context(|| format!("Failed to pack {}", src.display()))?;
            info!(output = %dst.display(), "Written");
        }
        Commands::Info { src } => {
            let bytes =
                std::fs::read(&src).with_context(|| format!("Failed to read {}", src.display()))?;
            let reader = ContainerReader::from_slice(&bytes)?;
            let stats = reader.stats();
            println!("file:               {}", src.display());
            println!("total size:         {} bytes", stats.total_size);
            println!("metadata:           {} bytes", stats.metadata_size);
            println!("reserved:           {:#010x}", stats.reserved);
            println!("payload (declared): {} bytes", stats.declared_payload_size);
            println!("payload (zstd):     {} bytes", stats.compressed_payload_size);
            let known = if stats.flags.is_known() { "" } else { " (unknown)" };
            println!("flags:              {}{}", stats.flags.bits(), known);
            println!("ratio:              {:.3}", stats.compression_ratio());
        }
        Commands::Batch {
            direction,
            dir,
            out_dir,
            continue_on_error,
        } => {
            config.continue_on_error |= continue_on_error;
            config.validate().map_err(anyhow::Error::msg)?;
            let out_dir = out_dir.unwrap_or_else(|| dir.join(".tmp"));
            let report = files::batch(&dir, &out_dir, direction.into(), &config)
                .with_context(|| format!("Batch conversion in {} failed", dir.display()))?;
            info!(
                converted = report.converted.len(),
                failed = report.failed.len(),
                "Batch finished"
            );
            if !report.is_success() {
                anyhow::bail!("{} file(s) failed to convert", report.failed.len());
            }
        }
    }

    Ok(())
}
