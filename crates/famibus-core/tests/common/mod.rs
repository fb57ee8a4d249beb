#![allow(dead_code)]

use anyhow::{Context, Result};
use ctor::ctor;
use famibus_core::{Nes, memory::ppu::Register};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub const PRG_UNIT: usize = 0x4000;
pub const CHR_UNIT: usize = 0x2000;

#[ctor]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_file(true)
        .with_line_number(true)
        .with_max_level(Level::DEBUG)
        .pretty()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

/// Assembles iNES images in memory.
#[derive(Debug, Clone)]
pub struct RomBuilder {
    mapper: u8,
    vertical: bool,
    trainer: bool,
    prg: Vec<u8>,
    chr: Vec<u8>,
}

impl Default for RomBuilder {
    fn default() -> Self {
        Self {
            mapper: 0,
            vertical: false,
            trainer: false,
            prg: vec![0; PRG_UNIT],
            chr: vec![0; CHR_UNIT],
        }
    }
}

impl RomBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mapper(mut self, mapper: u8) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn vertical(mut self) -> Self {
        self.vertical = true;
        self
    }

    pub fn trainer(mut self) -> Self {
        self.trainer = true;
        self
    }

    /// PRG ROM of `units` 16 KiB banks, each filled by `fill(bank, offset)`.
    pub fn prg_with(mut self, units: usize, fill: impl Fn(usize, usize) -> u8) -> Self {
        self.prg = (0..units * PRG_UNIT)
            .map(|i| fill(i / PRG_UNIT, i % PRG_UNIT))
            .collect();
        self
    }

    pub fn chr(mut self, chr: Vec<u8>) -> Self {
        self.chr = chr;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut flags6 = self.mapper << 4;
        if self.vertical {
            flags6 |= 0x01;
        }
        if self.trainer {
            flags6 |= 0x04;
        }
        let mut bytes = b"NES\x1A".to_vec();
        bytes.extend([
            (self.prg.len() / PRG_UNIT) as u8,
            (self.chr.len() / CHR_UNIT) as u8,
            flags6,
            self.mapper & 0xF0,
        ]);
        bytes.extend([0u8; 8]);
        if self.trainer {
            bytes.extend([0xEEu8; 512]);
        }
        bytes.extend(&self.prg);
        bytes.extend(&self.chr);
        bytes
    }

    pub fn load(&self) -> Result<Nes> {
        let mut nes = Nes::new();
        nes.load_rom(&self.build()).context("loading built rom")?;
        Ok(nes)
    }
}

/// CHR where tile 1 of both pattern tables is solid colour 1.
pub fn solid_tile_chr() -> Vec<u8> {
    let mut chr = vec![0u8; CHR_UNIT];
    for table in [0usize, 0x1000] {
        chr[table + 16..table + 24].fill(0xFF);
    }
    chr
}

pub fn ppu_register(reg: Register) -> u16 {
    0x2000 + u16::from(reg as u8)
}

/// Points the VRAM address at `addr` through `$2006`.
pub fn set_vram_addr(nes: &mut Nes, addr: u16) {
    nes.write(ppu_register(Register::Addr), (addr >> 8) as u8);
    nes.write(ppu_register(Register::Addr), addr as u8);
}

pub fn write_vram(nes: &mut Nes, addr: u16, bytes: &[u8]) {
    set_vram_addr(nes, addr);
    for &byte in bytes {
        nes.write(ppu_register(Register::Data), byte);
    }
}
