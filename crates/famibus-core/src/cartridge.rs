use std::{fs, path::Path};

use tracing::info;

use crate::{
    cartridge::header::{Header, Mirroring, NES_HEADER_LEN},
    error::Error,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
};

pub mod header;
pub mod mapper;

pub use mapper::{Mapper, Nrom, Provider};

pub const TRAINER_SIZE: usize = 512;

/// Parsed, immutable cartridge image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NesRom {
    header: Header,
    raw_header: [u8; NES_HEADER_LEN],
    trainer: Option<Box<[u8; TRAINER_SIZE]>>,
    prg_rom: Box<[u8]>,
    chr_rom: Box<[u8]>,
}

impl NesRom {
    /// Splits a `.nes` dump into header, trainer, PRG and CHR sections.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let header = Header::parse(bytes)?;
        let mut raw_header = [0u8; NES_HEADER_LEN];
        raw_header.copy_from_slice(&bytes[..NES_HEADER_LEN]);

        let mut cursor = NES_HEADER_LEN;
        let trainer = if header.trainer_present {
            let mut block = Box::new([0u8; TRAINER_SIZE]);
            block.copy_from_slice(section(bytes, &mut cursor, TRAINER_SIZE, "trainer")?);
            Some(block)
        } else {
            None
        };
        let prg_rom = section(bytes, &mut cursor, header.prg_rom_size(), "PRG ROM")?.into();
        let chr_rom = section(bytes, &mut cursor, header.chr_rom_size(), "CHR ROM")?.into();

        Ok(Self {
            header,
            raw_header,
            trainer,
            prg_rom,
            chr_rom,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The 16 header bytes exactly as stored in the dump.
    pub fn raw_header(&self) -> &[u8; NES_HEADER_LEN] {
        &self.raw_header
    }

    pub fn trainer(&self) -> Option<&[u8; TRAINER_SIZE]> {
        self.trainer.as_deref()
    }

    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    pub fn chr_rom(&self) -> &[u8] {
        &self.chr_rom
    }

    pub fn mapper_id(&self) -> u16 {
        self.header.mapper
    }

    pub fn nametable_arrangement(&self) -> Mirroring {
        self.header.mirroring
    }

    pub fn prg_bank_count_16k(&self) -> usize {
        usize::from(self.header.prg_units)
    }

    pub fn chr_bank_count_8k(&self) -> usize {
        usize::from(self.header.chr_units)
    }

    /// CPU-side PRG read at an already translated address.
    ///
    /// Only `$8000-$FFFF` is backed; the expansion/PRG-RAM window below it is
    /// not wired on the boards supported here and yields `None`.
    pub fn cpu_read(&self, addr: u16) -> Option<u8> {
        if addr < cpu_mem::PRG_ROM_START {
            return None;
        }
        self.prg_rom
            .get(usize::from(addr - cpu_mem::PRG_ROM_START))
            .copied()
    }

    /// PPU-side CHR read at an already translated pattern-table address.
    pub fn ppu_read(&self, addr: u16) -> Option<u8> {
        if addr >= ppu_mem::PATTERN_SPACE_END {
            return None;
        }
        self.chr_rom.get(usize::from(addr)).copied()
    }
}

/// An inserted cartridge: the ROM image plus the board that maps it.
#[derive(Debug)]
pub struct Cartridge {
    rom: NesRom,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    pub fn new(rom: NesRom, mapper: Box<dyn Mapper>) -> Self {
        Self { rom, mapper }
    }

    pub fn rom(&self) -> &NesRom {
        &self.rom
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    /// iNES mapper id from the header. A provided board may serve several
    /// ids; see [`Cartridge::board_id`].
    pub fn mapper_id(&self) -> u16 {
        self.rom.mapper_id()
    }

    /// Id of the board implementation actually mapping the cartridge.
    pub fn board_id(&self) -> u16 {
        self.mapper.mapper_id()
    }

    pub fn mirroring(&self) -> Mirroring {
        self.rom.nametable_arrangement()
    }

    pub(crate) fn log_summary(&self) {
        info!(
            mapper = self.rom.mapper_id(),
            board = self.mapper.name(),
            board_id = self.mapper.mapper_id(),
            prg_bytes = self.rom.prg_rom().len(),
            prg_banks = self.rom.prg_bank_count_16k(),
            chr_bytes = self.rom.chr_rom().len(),
            chr_banks = self.rom.chr_bank_count_8k(),
            arrangement = ?self.rom.nametable_arrangement(),
            trainer = self.rom.trainer().is_some(),
            "cartridge inserted"
        );
    }
}

impl Clone for Cartridge {
    fn clone(&self) -> Self {
        Self {
            rom: self.rom.clone(),
            mapper: self.mapper.clone(),
        }
    }
}

/// Load a cartridge from an in-memory byte slice.
pub fn load_cartridge(bytes: &[u8]) -> Result<Cartridge, Error> {
    load_cartridge_with_provider(bytes, None)
}

/// Load a cartridge, asking `provider` for boards the core does not know.
pub fn load_cartridge_with_provider(
    bytes: &[u8],
    provider: Option<&dyn Provider>,
) -> Result<Cartridge, Error> {
    let rom = NesRom::parse(bytes)?;

    let mapper: Box<dyn Mapper> = match rom.mapper_id() {
        Nrom::ID => Box::new(Nrom::new(&rom)),
        other => provider
            .and_then(|provider| provider.get_mapper(&rom))
            .ok_or(Error::UnsupportedMapper(other))?,
    };

    Ok(Cartridge::new(rom, mapper))
}

/// Load a cartridge directly from disk.
pub fn load_cartridge_from_file<P>(path: P) -> Result<Cartridge, Error>
where
    P: AsRef<Path>,
{
    let bytes = fs::read(path)?;
    load_cartridge(&bytes)
}

fn section<'a>(
    bytes: &'a [u8],
    cursor: &mut usize,
    len: usize,
    name: &'static str,
) -> Result<&'a [u8], Error> {
    let too_short = || Error::TooShort {
        section: name,
        expected: len,
        actual: bytes.len().saturating_sub(*cursor),
    };

    let end = cursor.checked_add(len).ok_or_else(too_short)?;
    let slice = bytes.get(*cursor..end).ok_or_else(too_short)?;
    *cursor = end;
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Origin;

    fn base_header(prg_banks: u8, chr_banks: u8, flags6: u8) -> [u8; NES_HEADER_LEN] {
        [
            b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, flags6, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ]
    }

    #[test]
    fn loads_basic_nrom_cartridge() {
        let mut rom = base_header(2, 1, 0).to_vec();
        rom.extend(vec![0xAA; 32 * 1024]);
        rom.extend(vec![0x55; 8 * 1024]);

        let cartridge = load_cartridge(&rom).expect("parse cartridge");

        assert_eq!(cartridge.rom().prg_bank_count_16k(), 2);
        assert_eq!(cartridge.rom().chr_bank_count_8k(), 1);
        assert_eq!(cartridge.mapper_id(), 0);
        assert_eq!(cartridge.rom().cpu_read(cpu_mem::PRG_ROM_START), Some(0xAA));
        assert_eq!(cartridge.rom().ppu_read(0x0000), Some(0x55));
        assert_eq!(cartridge.rom().cpu_read(0x6000), None);
    }

    #[test]
    fn loads_cartridge_with_trainer() {
        let mut rom = base_header(1, 0, 0b0000_0100).to_vec();
        rom.extend(vec![0xFE; TRAINER_SIZE]);
        rom.extend(vec![0xAA; 16 * 1024]);

        let cartridge = load_cartridge(&rom).expect("parse cartridge");

        assert!(cartridge.rom().trainer().is_some_and(|t| t[0] == 0xFE));
        assert_eq!(cartridge.rom().prg_rom().len(), 16 * 1024);
        assert_eq!(cartridge.rom().cpu_read(cpu_mem::PRG_ROM_START), Some(0xAA));
    }

    #[test]
    fn errors_when_prg_section_missing() {
        let mut rom = base_header(1, 0, 0).to_vec();
        rom.extend(vec![0xAA; 1024]);

        let err = load_cartridge(&rom).expect_err("should fail");
        assert!(matches!(
            err,
            Error::TooShort {
                section: "PRG ROM",
                expected: 16384,
                actual: 1024
            }
        ));
    }

    #[test]
    fn rejects_unknown_mapper_without_provider() {
        let mut rom = base_header(1, 1, 0x40).to_vec();
        rom.extend(vec![0; 24 * 1024]);

        let err = load_cartridge(&rom).expect_err("mapper 4 is not built in");
        assert!(matches!(err, Error::UnsupportedMapper(4)));
    }

    #[derive(Debug, Clone)]
    struct Passthrough;

    impl Mapper for Passthrough {
        fn mapper_id(&self) -> u16 {
            4
        }

        fn translate_address(&self, addr: u16, _origin: Origin) -> u16 {
            addr
        }
    }

    #[derive(Debug)]
    struct FourProvider;

    impl Provider for FourProvider {
        fn get_mapper(&self, rom: &NesRom) -> Option<Box<dyn Mapper>> {
            (rom.mapper_id() == 4).then(|| Box::new(Passthrough) as Box<dyn Mapper>)
        }
    }

    #[test]
    fn provider_supplies_unknown_boards() {
        let mut rom = base_header(1, 1, 0x40).to_vec();
        rom.extend(vec![0; 24 * 1024]);

        let cartridge =
            load_cartridge_with_provider(&rom, Some(&FourProvider)).expect("provided mapper");
        assert_eq!(cartridge.mapper_id(), 4);
        assert_eq!(cartridge.clone().mapper_id(), 4);
    }

    #[test]
    fn header_id_survives_a_shared_board() {
        #[derive(Debug)]
        struct NromForAll;

        impl Provider for NromForAll {
            fn get_mapper(&self, rom: &NesRom) -> Option<Box<dyn Mapper>> {
                Some(Box::new(Nrom::new(rom)))
            }
        }

        let mut rom = base_header(1, 1, 0x30).to_vec();
        rom.extend(vec![0x11; 24 * 1024]);

        let cartridge =
            load_cartridge_with_provider(&rom, Some(&NromForAll)).expect("provided mapper");
        assert_eq!(cartridge.mapper_id(), 3);
        assert_eq!(cartridge.board_id(), Nrom::ID);

        let copy = cartridge.clone();
        assert_eq!(copy.mapper_id(), 3);
        assert_eq!(copy.mapper().name(), "NROM");
        assert_eq!(copy.rom(), cartridge.rom());
    }
}
