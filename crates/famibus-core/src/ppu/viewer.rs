//! Debug views over PPU memory.
//!
//! These produce plain RGB images for tooling; nothing here touches PPU state
//! or goes through the bus.

use crate::ppu::{
    Ppu, SCREEN_HEIGHT, SCREEN_WIDTH,
    palette::Color,
    pattern::TILES_PER_TABLE,
};

/// Width and height of one pattern table sheet (16x16 tiles).
pub const PATTERN_SHEET_SIZE: usize = 128;
/// All four logical nametables laid out 2x2.
pub const NAMETABLE_SHEET_WIDTH: usize = SCREEN_WIDTH * 2;
pub const NAMETABLE_SHEET_HEIGHT: usize = SCREEN_HEIGHT * 2;

/// Master-palette entries used for pixel values 1..=3 of the pattern sheet
/// when the caller has no preference (dark grey, grey, white).
pub const DEFAULT_PATTERN_SHADES: [u8; 3] = [0x2D, 0x00, 0x30];

/// Packed RGB888 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RgbImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some(Color::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 3;
        self.pixels[i..i + 3].copy_from_slice(&[color.r, color.g, color.b]);
    }
}

impl Ppu {
    /// Renders pattern table `table` (0 or 1) as a 128x128 sheet.
    ///
    /// Pixel value 0 is black; values 1..=3 use the master-palette entries in
    /// `shades`.
    pub fn pattern_table_sheet(&self, table: usize, shades: [u8; 3]) -> RgbImage {
        let colors = [
            Color::BLACK,
            self.palette.color(shades[0]),
            self.palette.color(shades[1]),
            self.palette.color(shades[2]),
        ];
        let mut image = RgbImage::new(PATTERN_SHEET_SIZE, PATTERN_SHEET_SIZE);

        for (index, tile) in (0..TILES_PER_TABLE).zip(0u8..=u8::MAX) {
            let (tx, ty) = (index % 16, index / 16);
            for (i, &value) in self.patterns.tile(table, tile).iter().enumerate() {
                image.set_pixel(tx * 8 + i % 8, ty * 8 + i / 8, colors[usize::from(value)]);
            }
        }
        image
    }

    /// Renders all four logical nametables, unscrolled, as a 512x480 sheet.
    ///
    /// With `show_attributes` each cell is drawn as its 2x2 attribute
    /// quadrant pattern instead of the tile, coloured with the cell's palette.
    pub fn nametable_sheet(&self, show_attributes: bool) -> RgbImage {
        let table = self.registers.control.background_table();
        let mut image = RgbImage::new(NAMETABLE_SHEET_WIDTH, NAMETABLE_SHEET_HEIGHT);

        for nametable in 0u8..4 {
            let origin_x = usize::from(nametable & 1) * SCREEN_WIDTH;
            let origin_y = usize::from(nametable >> 1) * SCREEN_HEIGHT;
            for row in 0..SCREEN_HEIGHT / 8 {
                for column in 0..SCREEN_WIDTH / 8 {
                    let (tile_index, colors) = self.background_cell(nametable, column, row);
                    let tile = self.patterns.tile(table, tile_index);
                    for (i, &pixel) in tile.iter().enumerate() {
                        let (px, py) = (i % 8, i / 8);
                        let value = if show_attributes {
                            (px / 4) % 2 + ((py / 4) % 2) * 2
                        } else {
                            usize::from(pixel)
                        };
                        image.set_pixel(
                            origin_x + column * 8 + px,
                            origin_y + row * 8 + py,
                            colors[value],
                        );
                    }
                }
            }
        }
        image
    }
}
