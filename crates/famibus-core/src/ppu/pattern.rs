use crate::memory::ppu as ppu_mem;

/// Pixels in one decoded 8x8 tile, row-major.
pub const TILE_PIXELS: usize = 64;
/// Tiles per pattern table.
pub const TILES_PER_TABLE: usize = 256;

/// Raw CHR bytes plus the same data decoded to 2-bit pixel values.
///
/// Filled once per cartridge insertion; rendering and debug views read only
/// the decoded grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTables {
    raw: Box<[u8]>,
    tiles: Box<[[u8; TILE_PIXELS]]>,
}

impl Default for PatternTables {
    fn default() -> Self {
        Self {
            raw: vec![0; ppu_mem::CHR_SIZE].into_boxed_slice(),
            tiles: vec![[0; TILE_PIXELS]; ppu_mem::TILE_COUNT].into_boxed_slice(),
        }
    }
}

impl PatternTables {
    /// Replaces the CHR copy. Missing bytes read as zero, extra bytes are ignored.
    pub fn load(&mut self, chr: &[u8]) {
        self.raw.fill(0);
        let len = chr.len().min(self.raw.len());
        self.raw[..len].copy_from_slice(&chr[..len]);

        for (tile, planes) in self
            .tiles
            .iter_mut()
            .zip(self.raw.chunks_exact(ppu_mem::TILE_BYTES))
        {
            decode_tile(planes, tile);
        }
    }

    /// Raw CHR byte at a pattern-table address.
    pub fn byte(&self, addr: u16) -> Option<u8> {
        self.raw.get(usize::from(addr)).copied()
    }

    /// Decoded tile `index` of pattern table `table` (0 or 1).
    pub fn tile(&self, table: usize, index: u8) -> &[u8; TILE_PIXELS] {
        &self.tiles[(table & 1) * TILES_PER_TABLE + usize::from(index)]
    }
}

/// Combines the two bitplanes of a tile: plane 0 gives bit 0 of each pixel,
/// plane 1 gives bit 1. The leftmost pixel is the most significant bit.
fn decode_tile(planes: &[u8], out: &mut [u8; TILE_PIXELS]) {
    let (low, high) = planes.split_at(8);
    for (row, (&lo, &hi)) in low.iter().zip(high).enumerate() {
        for col in 0..8 {
            let bit = 7 - col;
            out[row * 8 + col] = (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1);
        }
    }
}
