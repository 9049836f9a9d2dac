//! romatlas - canonical map database builder for GBA ROM images
//!
//! Usage:
//!   romatlas extract <image.elf> <unit.c> --out <dir>  Build code/data/ram databases
//!   romatlas fmt <path> --category <cat>               Reformat a database canonically
//!   romatlas sizes <path> --category <cat>             Per-region size report
//!   romatlas export <path> --category <cat>            Render a database as JSON

use anyhow::Result;
use clap::{Parser, Subcommand};
use romatlas_core::Category;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{handle_export, handle_extract, handle_fmt, handle_sizes};

#[derive(Parser)]
#[command(name = "romatlas")]
#[command(about = "Canonical map database builder for GBA ROM images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise the log filter to debug
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full extraction pipeline against a linked image
    Extract {
        /// Path to the linked ELF image
        image: PathBuf,
        /// Path to the preprocessed C translation unit
        source: PathBuf,
        /// Directory receiving code.yml, data.yml, and ram.yml
        #[arg(short, long)]
        out: PathBuf,
        /// Toolchain prefix for readelf/nm (overrides ROMATLAS_TOOLCHAIN)
        #[arg(short, long)]
        toolchain: Option<String>,
    },
    /// Combine and canonically re-serialize a database
    Fmt {
        /// Database file, or directory of .yml parts
        path: PathBuf,
        /// Database category: code, data, ram, structs, or enums
        #[arg(short, long)]
        category: Category,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Report resolved per-region sizes for every record
    Sizes {
        /// Database file, or directory of .yml parts
        path: PathBuf,
        /// Database category: data or ram
        #[arg(short, long)]
        category: Category,
        /// Structs database for user-defined type sizes
        #[arg(short, long)]
        structs: Option<PathBuf>,
    },
    /// Render a database as JSON with hex-string integers
    Export {
        /// Database file, or directory of .yml parts
        path: PathBuf,
        /// Database category: code, data, ram, structs, or enums
        #[arg(short, long)]
        category: Category,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            image,
            source,
            out,
            toolchain,
        } => handle_extract(&image, &source, &out, toolchain.as_deref()),
        Commands::Fmt {
            path,
            category,
            out,
        } => handle_fmt(&path, category, out.as_deref()),
        Commands::Sizes {
            path,
            category,
            structs,
        } => handle_sizes(&path, category, structs.as_deref()),
        Commands::Export {
            path,
            category,
            out,
        } => handle_export(&path, category, out.as_deref()),
    }
}
