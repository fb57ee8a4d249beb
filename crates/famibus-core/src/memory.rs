//! Address constants for the CPU and PPU buses.
//!
//! Every range the dispatcher decodes lives here so the routing tables in
//! [`crate::bus`] and [`crate::ppu`] read as plain comparisons.

/// CPU-side address map.
pub mod cpu {
    /// First byte of CPU internal RAM.
    pub const INTERNAL_RAM_START: u16 = 0x0000;
    /// Last address of the mirrored internal RAM window (`$1FFF`).
    pub const INTERNAL_RAM_MIRROR_END: u16 = 0x1FFF;
    /// Physical internal RAM size. The window repeats every 2 KiB.
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    /// Mask folding a RAM mirror address onto its physical byte.
    pub const INTERNAL_RAM_MASK: u16 = (INTERNAL_RAM_SIZE as u16) - 1;

    /// First address of the PPU register mirror.
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    /// Last address of the PPU register mirror.
    pub const PPU_REGISTER_END: u16 = 0x3FFF;

    /// First APU register.
    pub const APU_REGISTER_BASE: u16 = 0x4000;
    /// Last channel register before `$4014`.
    pub const APU_REGISTER_END: u16 = 0x4013;
    /// APU status / channel enable (`$4015`).
    pub const APU_STATUS: u16 = 0x4015;
    /// Controller port 1 (`$4016`), also the strobe latch for both pads.
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Controller port 2 on reads (`$4017`).
    pub const CONTROLLER_PORT_2: u16 = 0x4017;

    /// Disabled test-mode registers.
    pub const TEST_MODE_BASE: u16 = 0x4018;
    pub const TEST_MODE_END: u16 = 0x401F;

    /// First address owned by the cartridge.
    pub const CARTRIDGE_SPACE_BASE: u16 = 0x4020;
    /// First PRG ROM address (`$8000`).
    pub const PRG_ROM_START: u16 = 0x8000;
    /// Start of the upper 16 KiB PRG window (`$C000`).
    pub const PRG_ROM_UPPER_START: u16 = 0xC000;
    pub const CPU_ADDR_END: u16 = 0xFFFF;
}

/// APU register offsets.
pub mod apu {
    /// Frame counter control (`$4017` on writes).
    pub const FRAME_COUNTER: u16 = 0x4017;
    /// Register file size covering `$4000-$4017`.
    pub const REGISTER_SPACE: usize = 0x18;
}

/// PPU register layout and VRAM map.
pub mod ppu {
    /// Mask selecting one of the eight registers from a mirror address.
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// Two physical nametables (2 KiB CIRAM).
    pub const CIRAM_SIZE: usize = 0x0800;
    /// VRAM addresses are 14 bits wide on the external bus.
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// Pattern table space ends here (exclusive).
    pub const PATTERN_SPACE_END: u16 = 0x2000;
    pub const PATTERN_TABLE_0: u16 = 0x0000;
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    /// Both pattern tables (8 KiB).
    pub const CHR_SIZE: usize = 0x2000;
    /// Bytes per 8x8 two-bitplane tile.
    pub const TILE_BYTES: usize = 16;
    /// Tiles across both pattern tables.
    pub const TILE_COUNT: usize = CHR_SIZE / TILE_BYTES;

    pub const NAMETABLE_BASE: u16 = 0x2000;
    /// Size of one logical nametable (including its attribute table).
    pub const NAMETABLE_SIZE: u16 = 0x0400;
    /// Nametable window end (exclusive).
    pub const NAMETABLE_END: u16 = 0x3000;
    /// Attribute table offset inside a nametable.
    pub const ATTRIBUTE_OFFSET: u16 = 0x03C0;

    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Sprite half of palette RAM.
    pub const SPRITE_PALETTE_BASE: u16 = 0x3F10;
    pub const PALETTE_RAM_SIZE: usize = 0x20;
    /// Palette RAM repeats every 32 bytes up to `$3FFF`.
    pub const PALETTE_STRIDE: u16 = 0x20;

    /// 64 sprites of 4 bytes each.
    pub const OAM_RAM_SIZE: usize = 0x100;
    pub const SPRITE_COUNT: usize = 64;
    /// Hardware limit of sprites fetched for one scanline.
    pub const SPRITES_PER_LINE: usize = 8;

    /// CPU address that triggers OAM DMA (`$4014`).
    pub const OAM_DMA: u16 = 0x4014;

    /// CPU-visible PPU registers, indexed by `(addr - $2000) % 8`.
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` PPUCTRL
        Control = 0,
        /// `$2001` PPUMASK
        Mask = 1,
        /// `$2002` PPUSTATUS
        Status = 2,
        /// `$2003` OAMADDR
        OamAddr = 3,
        /// `$2004` OAMDATA
        OamData = 4,
        /// `$2005` PPUSCROLL
        Scroll = 5,
        /// `$2006` PPUADDR
        Addr = 6,
        /// `$2007` PPUDATA
        Data = 7,
    }

    impl Register {
        /// Resolves the register for any address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr.wrapping_sub(super::cpu::PPU_REGISTER_BASE) & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }

        /// Register index within the 8-byte block.
        pub const fn index(self) -> u8 {
            self as u8
        }
    }
}
