//! Address decoding shared by every cartridge board.
//!
//! [`CpuBus`] is a short-lived view over the devices owned by [`crate::Nes`].
//! A read or write first goes through the inserted cartridge's
//! [`Mapper::translate_address`](crate::cartridge::Mapper::translate_address)
//! and then through the single routing table in [`Dispatch`] below.

use core::fmt;

use crate::{
    apu::Apu,
    cartridge::Cartridge,
    controller::InputSource,
    memory::{
        apu as apu_mem, cpu as cpu_mem,
        ppu::{self as ppu_mem, Register},
    },
    ppu::Ppu,
    ram::cpu as cpu_ram,
};

mod diagnostics;

pub use diagnostics::{BusFault, DIAGNOSTIC_CAPACITY, Diagnostics};

/// Which device initiated a bus access.
///
/// The low 8 KiB decode differently per origin: the CPU reaches internal RAM
/// there while the PPU reaches cartridge CHR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    #[default]
    Cpu,
    Ppu,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Cpu => "CPU",
            Origin::Ppu => "PPU",
        })
    }
}

/// Routes an already translated address to the device that answers it.
pub trait Dispatch {
    fn dispatch_read(&mut self, addr: u16, origin: Origin) -> u8;

    fn dispatch_write(&mut self, addr: u16, value: u8, origin: Origin);
}

/// Input ports at `$4016`/`$4017`.
pub type InputPorts = [Option<Box<dyn InputSource>>; 2];

/// Borrowed view of every device reachable from the system bus.
pub struct CpuBus<'a> {
    ram: &'a mut cpu_ram::Ram,
    ppu: &'a mut Ppu,
    apu: &'a mut Apu,
    cartridge: Option<&'a Cartridge>,
    inputs: &'a mut InputPorts,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> CpuBus<'a> {
    pub fn new(
        ram: &'a mut cpu_ram::Ram,
        ppu: &'a mut Ppu,
        apu: &'a mut Apu,
        cartridge: Option<&'a Cartridge>,
        inputs: &'a mut InputPorts,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            ram,
            ppu,
            apu,
            cartridge,
            inputs,
            diagnostics,
        }
    }

    /// Reads through the cartridge mapper, or straight through the routing
    /// table when no cartridge is inserted.
    pub fn read(&mut self, addr: u16, origin: Origin) -> u8 {
        match self.cartridge {
            Some(cart) => cart.mapper().read(self, addr, origin),
            None => self.dispatch_read(addr, origin),
        }
    }

    /// Writes through the cartridge mapper, mirroring [`CpuBus::read`].
    pub fn write(&mut self, addr: u16, value: u8, origin: Origin) {
        match self.cartridge {
            Some(cart) => cart.mapper().write(self, addr, value, origin),
            None => self.dispatch_write(addr, value, origin),
        }
    }

    /// Copies CPU page `page` (`$XX00-$XXFF`) into OAM.
    ///
    /// The page is read through the normal bus so RAM mirrors and cartridge
    /// translation apply; OAM is replaced in one step afterwards.
    fn oam_dma(&mut self, page: u8) {
        let base = u16::from(page) << 8;
        let mut data = [0u8; ppu_mem::OAM_RAM_SIZE];
        for (offset, byte) in (0u16..).zip(data.iter_mut()) {
            *byte = self.read(base | offset, Origin::Cpu);
        }
        self.ppu.write_oam_page(&data);
    }

    fn unmapped(&mut self, addr: u16, origin: Origin) -> u8 {
        self.diagnostics
            .report(BusFault::UnmappedAccess { addr, origin });
        0
    }

    fn read_input(&mut self, port: usize) -> u8 {
        self.inputs[port]
            .as_deref_mut()
            .map(|input| input.read())
            .unwrap_or(0)
    }
}

impl Dispatch for CpuBus<'_> {
    fn dispatch_read(&mut self, addr: u16, origin: Origin) -> u8 {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => match origin {
                Origin::Cpu => self.ram[usize::from(addr & cpu_mem::INTERNAL_RAM_MASK)],
                Origin::Ppu => match self.cartridge.and_then(|cart| cart.rom().ppu_read(addr)) {
                    Some(value) => value,
                    None => self.unmapped(addr, origin),
                },
            },
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => self
                .ppu
                .cpu_read(Register::from_cpu_addr(addr), self.diagnostics),
            cpu_mem::APU_STATUS => self.apu.read_status(),
            cpu_mem::CONTROLLER_PORT_1 => self.read_input(0),
            cpu_mem::CONTROLLER_PORT_2 => self.read_input(1),
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => {
                match self.cartridge.and_then(|cart| cart.rom().cpu_read(addr)) {
                    Some(value) => value,
                    None => self.unmapped(addr, origin),
                }
            }
            _ => self.unmapped(addr, origin),
        }
    }

    fn dispatch_write(&mut self, addr: u16, value: u8, origin: Origin) {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => match origin {
                Origin::Cpu => self.ram[usize::from(addr & cpu_mem::INTERNAL_RAM_MASK)] = value,
                Origin::Ppu => self
                    .diagnostics
                    .report(BusFault::IllegalPpuWrite { addr, value }),
            },
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                self.ppu
                    .cpu_write(Register::from_cpu_addr(addr), value, self.diagnostics)
            }
            ppu_mem::OAM_DMA => self.oam_dma(value),
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::APU_REGISTER_END
            | cpu_mem::APU_STATUS
            | apu_mem::FRAME_COUNTER => self.apu.cpu_write(addr, value),
            cpu_mem::CONTROLLER_PORT_1 => {
                for input in self.inputs.iter_mut().flatten() {
                    input.write_strobe(value);
                }
            }
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => self
                .diagnostics
                .report(BusFault::ReadOnlyRegionWrite {
                    addr,
                    value,
                    origin,
                }),
            _ => {
                self.unmapped(addr, origin);
            }
        }
    }
}
