use bitflags::bitflags;

bitflags! {
    /// Sprite byte 2.
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpriteAttributes: u8 {
        const PALETTE = 0b0000_0011;
        /// Drawn only where the background pixel is transparent.
        const BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

impl SpriteAttributes {
    pub fn palette(self) -> u8 {
        self.bits() & Self::PALETTE.bits()
    }
}

/// One OAM entry decoded from its four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sprite {
    /// Scanline on which the sprite is evaluated; it becomes visible one
    /// line later.
    pub y: u8,
    pub tile: u8,
    pub attributes: SpriteAttributes,
    pub x: u8,
}

impl Sprite {
    pub const BYTES: usize = 4;

    pub fn from_bytes(bytes: [u8; Self::BYTES]) -> Self {
        Self {
            y: bytes[0],
            tile: bytes[1],
            attributes: SpriteAttributes::from_bits_retain(bytes[2]),
            x: bytes[3],
        }
    }

    /// `true` when `line` falls within the sprite's rows, counted from `y`.
    pub fn covers(&self, line: u16, height: u16) -> bool {
        let top = u16::from(self.y);
        line >= top && line < top + height
    }

    /// Pattern table and tile index holding sprite row `row` (already flipped).
    ///
    /// 8x16 sprites pick their table from bit 0 of the tile byte and span two
    /// consecutive tiles.
    pub fn tile_for_row(&self, row: u16, height: u16, sprite_table: usize) -> (usize, u8) {
        if height == 16 {
            let table = usize::from(self.tile & 1);
            let top = self.tile & 0xFE;
            (table, if row < 8 { top } else { top.wrapping_add(1) })
        } else {
            (sprite_table, self.tile)
        }
    }
}
