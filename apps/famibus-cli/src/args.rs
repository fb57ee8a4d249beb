use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

/// Headless NES frame renderer
#[derive(Parser, Debug)]
#[command(name = "famibus", author, version, about, long_about = None)]
pub struct Args {
    /// Path to the iNES ROM file
    #[arg(required = true)]
    pub rom: PathBuf,

    /// Number of frames to render
    #[arg(short, long, default_value_t = 1)]
    pub frames: u32,

    /// Write the last rendered frame as a PNG
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write both pattern tables side by side as a PNG
    #[arg(long)]
    pub pattern_tables: Option<PathBuf>,

    /// Write all four nametables as a PNG
    #[arg(long)]
    pub nametables: Option<PathBuf>,

    /// Draw attribute quadrants instead of tiles in the nametable view
    #[arg(long)]
    pub show_attributes: bool,

    /// 192-byte `.pal` file replacing the built-in master palette
    #[arg(long)]
    pub palette: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: Level,
}
