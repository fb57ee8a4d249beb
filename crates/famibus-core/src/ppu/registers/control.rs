use bitflags::bitflags;

bitflags! {
    /// PPUCTRL (`$2000`).
    ///
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N M S B s I n n
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Control: u8 {
        /// Base nametable (`$2000`, `$2400`, `$2800`, `$2C00`).
        const NAMETABLE = 0b0000_0011;
        /// VRAM increment per `$2007` access: 1 when clear, 32 when set.
        const INCREMENT_32 = 0b0000_0100;
        /// Pattern table for 8x8 sprites.
        const SPRITE_TABLE = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        /// 8x16 sprites.
        const SPRITE_SIZE_16 = 0b0010_0000;
        const MASTER_SLAVE = 0b0100_0000;
        /// Raise NMI when vblank starts.
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Control {
    pub fn nametable_index(self) -> u8 {
        self.bits() & 0b11
    }

    pub fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) {
            32
        } else {
            1
        }
    }

    /// Pattern table index (0 or 1) used by 8x8 sprites.
    pub fn sprite_table(self) -> usize {
        usize::from(self.contains(Control::SPRITE_TABLE))
    }

    /// Pattern table index (0 or 1) used by the background.
    pub fn background_table(self) -> usize {
        usize::from(self.contains(Control::BACKGROUND_TABLE))
    }

    pub fn sprite_height(self) -> u16 {
        if self.contains(Control::SPRITE_SIZE_16) {
            16
        } else {
            8
        }
    }

    pub fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }
}
