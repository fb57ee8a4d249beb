//! iNES header decoding.
//!
//! The first 16 bytes of a `.nes` dump describe the size of the PRG and CHR
//! sections, whether a 512-byte trainer precedes them, the mapper board and the
//! hardwired nametable arrangement.
//!
//! ```text
//! 0-3  "NES" 0x1A
//! 4    PRG ROM size in 16 KiB units
//! 5    CHR ROM size in 8 KiB units
//! 6    flags 6: mirroring, battery, trainer, four-screen, mapper low nibble
//! 7    flags 7: console type, NES 2.0 marker, mapper high nibble
//! 8-15 ignored
//! ```

use bitflags::bitflags;

use crate::error::Error;

pub(crate) const NES_MAGIC: &[u8; 4] = b"NES\x1A";

/// Size of the fixed iNES header in bytes.
pub const NES_HEADER_LEN: usize = 16;

/// PRG ROM unit size (16 KiB).
pub const PRG_BANK_SIZE: usize = 16 * 1024;
/// CHR ROM unit size (8 KiB).
pub const CHR_BANK_SIZE: usize = 8 * 1024;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags6: u8 {
        /// Set for vertical arrangement, clear for horizontal.
        const MIRRORING        = 0b0000_0001;
        const BATTERY          = 0b0000_0010;
        const TRAINER          = 0b0000_0100;
        const FOUR_SCREEN      = 0b0000_1000;
        const MAPPER_LOW_MASK  = 0b1111_0000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags7: u8 {
        const VS_UNISYSTEM     = 0b0000_0001;
        const PLAYCHOICE_10    = 0b0000_0010;
        const NES2_DETECTION   = 0b0000_1100;
        const MAPPER_HIGH_MASK = 0b1111_0000;
    }
}

/// Hardwired nametable arrangement of the cartridge.
///
/// Named after the direction the two physical tables are mirrored in:
/// `Vertical` maps logical tables 0/2 and 1/3 together, `Horizontal` maps 0/1
/// and 2/3 together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mirroring {
    #[default]
    Horizontal,
    Vertical,
}

/// Decoded iNES header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub flags6: Flags6,
    pub flags7: Flags7,
    /// Mapper id assembled from both flag nibbles.
    pub mapper: u16,
    pub mirroring: Mirroring,
    pub trainer_present: bool,
    /// PRG ROM units (16 KiB each) as stored in byte 4.
    pub prg_units: u8,
    /// CHR ROM units (8 KiB each) as stored in byte 5.
    pub chr_units: u8,
}

impl Header {
    /// Parses the first [`NES_HEADER_LEN`] bytes of a dump.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        // The magic is checked before the length so that any buffer without
        // a complete signature, however short, is reported as such.
        if bytes.get(..NES_MAGIC.len()) != Some(NES_MAGIC.as_slice()) {
            return Err(Error::BadSignature);
        }
        if bytes.len() < NES_HEADER_LEN {
            return Err(Error::TooShort {
                section: "header",
                expected: NES_HEADER_LEN,
                actual: bytes.len(),
            });
        }

        let flags6 = Flags6::from_bits_retain(bytes[6]);
        let flags7 = Flags7::from_bits_retain(bytes[7]);

        Ok(Self {
            flags6,
            flags7,
            mapper: combine_mapper(flags6, flags7),
            mirroring: if flags6.contains(Flags6::MIRRORING) {
                Mirroring::Vertical
            } else {
                Mirroring::Horizontal
            },
            trainer_present: flags6.contains(Flags6::TRAINER),
            prg_units: bytes[4],
            chr_units: bytes[5],
        })
    }

    /// PRG ROM size in bytes.
    pub fn prg_rom_size(&self) -> usize {
        usize::from(self.prg_units) * PRG_BANK_SIZE
    }

    /// CHR ROM size in bytes.
    pub fn chr_rom_size(&self) -> usize {
        usize::from(self.chr_units) * CHR_BANK_SIZE
    }
}

fn combine_mapper(flags6: Flags6, flags7: Flags7) -> u16 {
    let low = (flags6 & Flags6::MAPPER_LOW_MASK).bits() >> 4;
    let high = (flags7 & Flags7::MAPPER_HIGH_MASK).bits();
    u16::from(high | low)
}
