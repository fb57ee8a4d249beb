mod args;
mod image;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use famibus_core::{
    Nes,
    ppu::{
        buffer::{FrameBuffer, FrameSink},
        palette::Palette,
        viewer::{DEFAULT_PATTERN_SHADES, PATTERN_SHEET_SIZE},
    },
};
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::args::Args;

/// Logs each presented frame.
#[derive(Debug, Default)]
struct TraceSink {
    presented: u64,
}

impl FrameSink for TraceSink {
    fn present(&mut self, frame: &FrameBuffer) {
        self.presented += 1;
        debug!(
            frame = self.presented,
            width = frame.width(),
            height = frame.height(),
            "frame presented"
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut nes = Nes::new();
    if let Some(path) = &args.palette {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        nes.set_palette(Palette::from_bytes(&bytes)?);
        info!(path = %path.display(), "custom palette loaded");
    }
    nes.load_rom_from_file(&args.rom)
        .with_context(|| format!("loading {}", args.rom.display()))?;
    nes.set_frame_sink(Some(Box::new(TraceSink::default())));

    for _ in 0..args.frames {
        nes.run_frame();
    }
    info!(frames = nes.frame_count(), "rendering finished");

    if let Some(path) = &args.out {
        let frame = nes.ppu().frame();
        image::write_rgb_png(path, frame.width(), frame.height(), frame.as_bytes())?;
        info!(path = %path.display(), "frame written");
    }

    if let Some(path) = &args.pattern_tables {
        let ppu = nes.ppu();
        let left = ppu.pattern_table_sheet(0, DEFAULT_PATTERN_SHADES);
        let right = ppu.pattern_table_sheet(1, DEFAULT_PATTERN_SHADES);
        let rgb = image::side_by_side(&left, &right);
        image::write_rgb_png(path, PATTERN_SHEET_SIZE * 2, PATTERN_SHEET_SIZE, &rgb)?;
        info!(path = %path.display(), "pattern tables written");
    }

    if let Some(path) = &args.nametables {
        image::write_image(path, &nes.ppu().nametable_sheet(args.show_attributes))?;
        info!(path = %path.display(), "nametables written");
    }

    let total = nes.diagnostic_count();
    if total > 0 {
        for fault in nes.take_diagnostics() {
            warn!(%fault, "bus fault");
        }
        warn!(total, "bus faults during run");
    }
    Ok(())
}
