//! Mapper 0 (NROM).
//!
//! NROM has no banking hardware. The CPU sees PRG ROM at `$8000-$FFFF` and the
//! PPU sees 8 KiB of CHR at `$0000-$1FFF`.
//!
//! - **NROM-128 (16 KiB)**: the single bank answers at both `$8000-$BFFF` and
//!   `$C000-$FFFF`, because the top address line is not connected.
//! - **NROM-256 (32 KiB)**: both windows are distinct.
//!
//! # Reference
//! - [NROM on NESdev Wiki](https://www.nesdev.org/wiki/NROM)

use crate::{
    bus::Origin,
    cartridge::{Mapper, NesRom},
    memory::cpu as cpu_mem,
};

/// Distance between the two 16 KiB PRG windows.
const PRG_WINDOW_SPAN: u16 = cpu_mem::PRG_ROM_UPPER_START - cpu_mem::PRG_ROM_START;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nrom {
    /// PRG bank count captured from the ROM this board was built for.
    prg_banks: usize,
}

impl Nrom {
    pub const ID: u16 = 0;

    pub fn new(rom: &NesRom) -> Self {
        Self {
            prg_banks: rom.prg_bank_count_16k(),
        }
    }
}

impl Mapper for Nrom {
    fn mapper_id(&self) -> u16 {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "NROM"
    }

    fn translate_address(&self, addr: u16, origin: Origin) -> u16 {
        match origin {
            Origin::Cpu if addr >= cpu_mem::PRG_ROM_UPPER_START && self.prg_banks == 1 => {
                addr - PRG_WINDOW_SPAN
            }
            _ => addr,
        }
    }
}
