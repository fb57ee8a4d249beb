mod common;

use anyhow::Result;
use common::RomBuilder;
use famibus_core::{
    Nes,
    bus::{BusFault, DIAGNOSTIC_CAPACITY, Origin},
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn internal_ram_mirrors_every_2k(addr in 0u16..0x2000, value: u8) {
        let mut nes = Nes::new();
        nes.write(addr, value);
        for mirror in 0..4u16 {
            prop_assert_eq!(nes.read((addr & 0x07FF) + mirror * 0x0800), value);
        }
        prop_assert!(nes.take_diagnostics().is_empty());
    }

    #[test]
    fn single_bank_nrom_mirrors_prg(k in 0u16..0x4000) {
        let mut nes = RomBuilder::new()
            .prg_with(1, |_, offset| (offset ^ (offset >> 8)) as u8)
            .load()
            .expect("rom loads");
        prop_assert_eq!(nes.read(0x8000 + k), nes.read(0xC000 + k));
    }

    #[test]
    fn ppu_registers_mirror_every_8_bytes(
        mirrors in prop::array::uniform4(0u16..0x400),
        oam_addr: u8,
        vram_offset in 0u16..0x0400,
        value: u8,
    ) {
        let mut nes = RomBuilder::new().load().expect("rom loads");
        let reg = |mirror: u16, index: u16| 0x2000 + mirror * 8 + index;
        let vram = 0x2000 + vram_offset;

        // OAMADDR
        nes.write(reg(mirrors[0], 3), oam_addr);
        prop_assert_eq!(nes.ppu().oam_addr(), oam_addr);

        // A dangling first write through one mirror is cancelled by a status
        // read through another.
        nes.write(reg(mirrors[1], 6), 0x3F);
        nes.read(reg(mirrors[2], 2));
        prop_assert!(!nes.ppu().write_latch());

        // Address and data ports through different mirrors.
        nes.write(reg(mirrors[3], 6), (vram >> 8) as u8);
        nes.write(reg(mirrors[0], 6), vram as u8);
        prop_assert_eq!(nes.ppu().vram_addr().raw(), vram);
        nes.write(reg(mirrors[1], 7), value);

        nes.write(reg(mirrors[2], 6), (vram >> 8) as u8);
        nes.write(reg(mirrors[3], 6), vram as u8);
        prop_assert_eq!(nes.read(reg(mirrors[0], 7)), value);
        prop_assert!(nes.take_diagnostics().is_empty());
    }
}

#[test]
fn cpu_origin_reads_prg_and_ppu_origin_reads_chr() -> Result<()> {
    let mut chr = vec![0u8; common::CHR_UNIT];
    chr[0x0123] = 0x5A;
    let mut nes = RomBuilder::new()
        .prg_with(2, |bank, offset| if offset == 0 { 0xB0 + bank as u8 } else { 0 })
        .chr(chr)
        .load()?;

    assert_eq!(nes.read(0x8000), 0xB0);
    assert_eq!(nes.read(0xC000), 0xB1);
    assert_eq!(nes.read_as(0x0123, Origin::Ppu), 0x5A);
    assert!(nes.take_diagnostics().is_empty());
    Ok(())
}

#[test]
fn nrom_128_mirrors_upper_bank() -> Result<()> {
    let mut nes = RomBuilder::new()
        .prg_with(1, |_, offset| (offset & 0xFF) as u8)
        .load()?;
    assert_eq!(nes.read(0xC005), nes.read(0x8005));
    assert_eq!(nes.read(0xFFFF), 0xFF);
    Ok(())
}

#[test]
fn faults_are_recorded_without_stopping() -> Result<()> {
    let mut nes = RomBuilder::new().load()?;

    assert_eq!(nes.read(0x5000), 0);
    nes.write(0x8000, 0x12);
    nes.write_as(0x0010, 0x34, Origin::Ppu);
    assert_eq!(nes.read(0x4018), 0);

    let faults = nes.take_diagnostics();
    assert_eq!(
        faults,
        [
            BusFault::UnmappedAccess {
                addr: 0x5000,
                origin: Origin::Cpu
            },
            BusFault::ReadOnlyRegionWrite {
                addr: 0x8000,
                value: 0x12,
                origin: Origin::Cpu
            },
            BusFault::IllegalPpuWrite {
                addr: 0x0010,
                value: 0x34
            },
            BusFault::UnmappedAccess {
                addr: 0x4018,
                origin: Origin::Cpu
            },
        ]
    );
    assert_eq!(nes.read(0x8000), 0);
    assert_eq!(nes.read(0x0010), 0);
    Ok(())
}

#[test]
fn diagnostic_ring_keeps_the_latest_faults() {
    let mut nes = Nes::new();
    for i in 0..(DIAGNOSTIC_CAPACITY as u16 + 10) {
        nes.read(0x5000 + i);
    }
    let faults = nes.take_diagnostics();
    assert_eq!(faults.len(), DIAGNOSTIC_CAPACITY);
    assert_eq!(faults[0].addr(), 0x500A);
    assert_eq!(nes.diagnostic_count(), DIAGNOSTIC_CAPACITY as u64 + 10);
    assert!(nes.take_diagnostics().is_empty());
}

#[test]
fn apu_registers_accept_writes() {
    let mut nes = Nes::new();
    nes.write(0x4015, 0x01);
    nes.write(0x4003, 0x08);
    nes.write(0x4017, 0x40);
    assert_eq!(nes.apu().register(0x4003), Some(0x08));
    assert_eq!(nes.read(0x4015) & 0x01, 0x01);
    assert!(nes.take_diagnostics().is_empty());
}
