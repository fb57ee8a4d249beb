//! RGB output of the frame renderer and the sink that consumes it.

use std::fmt::Debug;

use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH, palette::Color};

/// Bytes per packed RGB888 pixel.
pub const BYTES_PER_PIXEL: usize = 3;
/// Size of one full frame in bytes.
pub const FRAME_BYTES: usize = SCREEN_WIDTH * SCREEN_HEIGHT * BYTES_PER_PIXEL;

/// Presentation collaborator that receives each completed frame.
pub trait FrameSink: Debug {
    fn present(&mut self, frame: &FrameBuffer);
}

/// 256x240 RGB888 framebuffer, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Box<[u8]>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: vec![0; FRAME_BYTES].into_boxed_slice(),
        }
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    /// Writes a pixel; coordinates outside the visible area are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some(offset) = Self::offset(x, y) else {
            return;
        };
        self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&[color.r, color.g, color.b]);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        let offset = Self::offset(i32::try_from(x).ok()?, i32::try_from(y).ok()?)?;
        let rgb = &self.pixels[offset..offset + BYTES_PER_PIXEL];
        Some(Color::new(rgb[0], rgb[1], rgb[2]))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn clear(&mut self, color: Color) {
        for rgb in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            rgb.copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    fn offset(x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < SCREEN_WIDTH)?;
        let y = usize::try_from(y).ok().filter(|&y| y < SCREEN_HEIGHT)?;
        Some((y * SCREEN_WIDTH + x) * BYTES_PER_PIXEL)
    }
}

impl Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &SCREEN_WIDTH)
            .field("height", &SCREEN_HEIGHT)
            .finish_non_exhaustive()
    }
}
