use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use famibus_core::ppu::viewer::{PATTERN_SHEET_SIZE, RgbImage};

/// Writes packed RGB888 pixels as an 8-bit PNG.
pub fn write_rgb_png(path: &Path, width: usize, height: usize, rgb: &[u8]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        u32::try_from(width)?,
        u32::try_from(height)?,
    );
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgb)?;
    Ok(())
}

pub fn write_image(path: &Path, image: &RgbImage) -> Result<()> {
    write_rgb_png(path, image.width(), image.height(), image.as_bytes())
}

/// Places two pattern sheets next to each other (table 0 left).
pub fn side_by_side(left: &RgbImage, right: &RgbImage) -> Vec<u8> {
    let row_bytes = PATTERN_SHEET_SIZE * 3;
    left.as_bytes()
        .chunks_exact(row_bytes)
        .zip(right.as_bytes().chunks_exact(row_bytes))
        .flat_map(|(l, r)| l.iter().chain(r).copied())
        .collect()
}
