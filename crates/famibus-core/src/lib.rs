use std::path::Path;

use tracing::{debug, info};

use crate::{
    apu::Apu,
    bus::{BusFault, CpuBus, Diagnostics, InputPorts, Origin},
    cartridge::{Cartridge, Provider},
    controller::{Button, InputSource},
    cpu::Cpu,
    memory::ppu as ppu_mem,
    ppu::{Ppu, buffer::FrameSink, palette::Palette},
    ram::cpu as cpu_ram,
};

pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod ppu;
pub mod ram;

pub use error::Error;

/// The console: CPU address space, PPU, APU register file and whatever is
/// plugged into it.
///
/// The CPU core itself is an external collaborator attached with
/// [`Nes::set_cpu`]; it only receives NMI requests from [`Nes::run_frame`].
///
/// Device state changes only through the bus and the setters below. The PPU
/// is readable but cannot be driven directly:
///
/// ```compile_fail
/// let mut nes = famibus_core::Nes::new();
/// nes.ppu_mut().write_oam_page(&[0; 256]);
/// ```
///
/// ```compile_fail
/// let mut ppu = famibus_core::ppu::Ppu::new();
/// ppu.set_mirroring(famibus_core::cartridge::header::Mirroring::Vertical);
/// ```
#[derive(Debug)]
pub struct Nes {
    ram: cpu_ram::Ram,
    ppu: Ppu,
    apu: Apu,
    cartridge: Option<Cartridge>,
    mapper_provider: Option<Box<dyn Provider>>,
    inputs: InputPorts,
    cpu: Option<Box<dyn Cpu>>,
    frame_sink: Option<Box<dyn FrameSink>>,
    diagnostics: Diagnostics,
    frame_count: u64,
}

impl Default for Nes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nes {
    /// Constructs a powered-on console with no cartridge inserted.
    pub fn new() -> Self {
        let mut nes = Self {
            ram: cpu_ram::Ram::new(),
            ppu: Ppu::new(),
            apu: Apu::new(),
            cartridge: None,
            mapper_provider: None,
            inputs: [None, None],
            cpu: None,
            frame_sink: None,
            diagnostics: Diagnostics::new(),
            frame_count: 0,
        };
        nes.power_on_reset();
        nes
    }

    /// Clears CPU RAM, PPU and APU state. The cartridge, palette and attached
    /// collaborators stay in place.
    pub fn power_on_reset(&mut self) {
        self.ram.clear();
        self.ppu.reset();
        self.apu.reset();
        self.frame_count = 0;
    }

    /// Replaces the mapper provider consulted by [`Nes::load_rom`] for
    /// mappers other than NROM.
    pub fn set_mapper_provider(&mut self, provider: Option<Box<dyn Provider>>) {
        self.mapper_provider = provider;
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.ppu.set_palette(palette);
    }

    pub fn set_frame_sink(&mut self, sink: Option<Box<dyn FrameSink>>) {
        self.frame_sink = sink;
    }

    /// Plugs an input device into port 0 (`$4016`) or 1 (`$4017`).
    /// Out-of-range ports are ignored.
    pub fn set_input(&mut self, port: usize, input: Option<Box<dyn InputSource>>) {
        if let Some(slot) = self.inputs.get_mut(port) {
            *slot = input;
        }
    }

    /// Presses or releases `button` on the device in `port`, if any.
    pub fn set_button(&mut self, port: usize, button: Button, pressed: bool) {
        if let Some(input) = self.input_mut(port) {
            input.set_button(button, pressed);
        }
    }

    /// The device plugged into `port`, for host-side updates.
    pub fn input_mut(&mut self, port: usize) -> Option<&mut dyn InputSource> {
        match self.inputs.get_mut(port)? {
            Some(input) => Some(input.as_mut()),
            None => None,
        }
    }

    pub fn set_cpu(&mut self, cpu: Option<Box<dyn Cpu>>) {
        self.cpu = cpu;
    }

    /// Parses `bytes`, builds its mapper and inserts the cartridge.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let cartridge =
            cartridge::load_cartridge_with_provider(bytes, self.mapper_provider.as_deref())?;
        self.insert_cartridge(cartridge);
        Ok(())
    }

    pub fn load_rom_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let bytes = std::fs::read(path)?;
        self.load_rom(&bytes)
    }

    /// Inserts a cartridge and power-cycles the console.
    ///
    /// The nametable arrangement comes from the header, and the PPU pattern
    /// cache is filled by reading CHR through the bus as the PPU.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        cartridge.log_summary();
        self.ppu.set_mirroring(cartridge.mirroring());
        let chr_len = cartridge.rom().chr_rom().len().min(ppu_mem::CHR_SIZE);
        self.cartridge = Some(cartridge);
        self.power_on_reset();

        let mut chr = vec![0u8; chr_len];
        let mut bus = self.bus();
        for (addr, byte) in (0u16..).zip(chr.iter_mut()) {
            *byte = bus.read(addr, Origin::Ppu);
        }
        self.ppu.load_pattern_data(&chr);
    }

    /// Removes the cartridge and power-cycles the console.
    pub fn eject_cartridge(&mut self) -> Option<Cartridge> {
        let cartridge = self.cartridge.take();
        if cartridge.is_some() {
            info!("cartridge ejected");
        }
        self.ppu.load_pattern_data(&[]);
        self.power_on_reset();
        cartridge
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    /// CPU read of `addr`.
    pub fn read(&mut self, addr: u16) -> u8 {
        self.read_as(addr, Origin::Cpu)
    }

    /// CPU write of `value` to `addr`.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.write_as(addr, value, Origin::Cpu);
    }

    pub fn read_as(&mut self, addr: u16, origin: Origin) -> u8 {
        self.bus().read(addr, origin)
    }

    pub fn write_as(&mut self, addr: u16, value: u8, origin: Origin) {
        self.bus().write(addr, value, origin);
    }

    /// Renders one frame, raises NMI on the attached CPU when enabled, and
    /// hands the frame to the sink.
    pub fn run_frame(&mut self) {
        let nmi = self.ppu.render_frame();
        if nmi {
            if let Some(cpu) = self.cpu.as_deref_mut() {
                cpu.request_nmi();
            }
        }
        if let Some(sink) = self.frame_sink.as_deref_mut() {
            sink.present(self.ppu.frame());
        }
        self.frame_count += 1;
        debug!(frame = self.frame_count, nmi, "frame complete");
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    /// Acknowledges the nametable view refresh flag after a host redraws
    /// its nametable sheet.
    pub fn clear_nametables_dirty(&mut self) {
        self.ppu.clear_nametables_dirty();
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn ram(&self) -> &[u8] {
        &self.ram[..]
    }

    /// Drains the recorded bus faults, oldest first.
    pub fn take_diagnostics(&mut self) -> Vec<BusFault> {
        self.diagnostics.take()
    }

    /// Faults reported since power-on, including ones already drained or
    /// dropped from the ring.
    pub fn diagnostic_count(&self) -> u64 {
        self.diagnostics.total()
    }

    fn bus(&mut self) -> CpuBus<'_> {
        CpuBus::new(
            &mut self.ram,
            &mut self.ppu,
            &mut self.apu,
            self.cartridge.as_ref(),
            &mut self.inputs,
            &mut self.diagnostics,
        )
    }
}

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    use super::*;
    use crate::{
        cartridge::{Mapper, NesRom, header::NES_MAGIC},
        controller::Controller,
        cpu::NmiCounter,
    };

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

    fn rom(mapper: u8, prg_units: u8, chr: &[u8]) -> Vec<u8> {
        let mut bytes = NES_MAGIC.to_vec();
        bytes.extend([prg_units, 1, mapper << 4, mapper & 0xF0, 0, 0, 0, 0, 0, 0, 0, 0]);
        for unit in 0..prg_units {
            bytes.extend(std::iter::repeat_n(unit, 0x4000));
        }
        let mut chr_bank = vec![0u8; 0x2000];
        chr_bank[..chr.len()].copy_from_slice(chr);
        bytes.extend(chr_bank);
        bytes
    }

    #[test]
    fn insertion_loads_patterns_through_the_bus() {
        let mut nes = Nes::new();
        nes.load_rom(&rom(0, 1, &[0xAA, 0x55])).expect("rom loads");
        assert_eq!(nes.ppu().patterns().byte(0), Some(0xAA));
        assert_eq!(nes.ppu().patterns().byte(1), Some(0x55));
        assert_eq!(nes.read_as(0x0001, Origin::Ppu), 0x55);
        assert!(nes.take_diagnostics().is_empty());
    }

    #[test]
    fn unknown_mapper_needs_a_provider() {
        #[derive(Debug)]
        struct Fallback;
        impl Provider for Fallback {
            fn get_mapper(&self, rom: &NesRom) -> Option<Box<dyn Mapper>> {
                Some(Box::new(cartridge::Nrom::new(rom)))
            }
        }

        let mut nes = Nes::new();
        assert!(matches!(
            nes.load_rom(&rom(3, 1, &[])),
            Err(Error::UnsupportedMapper(3))
        ));
        nes.set_mapper_provider(Some(Box::new(Fallback)));
        nes.load_rom(&rom(3, 1, &[])).expect("provider supplies a mapper");
        assert_eq!(nes.cartridge().map(Cartridge::mapper_id), Some(3));
    }

    #[test]
    fn nmi_reaches_attached_cpu() {
        #[derive(Debug)]
        struct Shared(std::rc::Rc<std::cell::Cell<u64>>);
        impl Cpu for Shared {
            fn request_nmi(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut nes = Nes::new();
        nes.set_cpu(Some(Box::new(Shared(count.clone()))));
        nes.run_frame();
        assert_eq!(count.get(), 0);

        nes.write(0x2000, 0x80);
        nes.run_frame();
        nes.run_frame();
        assert_eq!(count.get(), 2);
        assert_eq!(nes.frame_count(), 3);

        nes.set_cpu(Some(Box::new(NmiCounter::default())));
        nes.run_frame();
    }

    #[test]
    fn controller_is_read_serially() {
        let mut pad = Controller::new();
        pad.set_button(Button::A, true);
        pad.set_button(Button::Start, true);

        let mut nes = Nes::new();
        nes.set_input(0, Some(Box::new(pad)));
        nes.write(0x4016, 1);
        nes.write(0x4016, 0);
        let bits: Vec<u8> = (0..8).map(|_| nes.read(0x4016) & 1).collect();
        assert_eq!(bits, [1, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(nes.read(0x4017), 0);
    }

    #[test]
    fn buttons_can_be_pressed_after_plugging_in() {
        let mut nes = Nes::new();
        nes.set_input(0, Some(Box::new(Controller::new())));
        nes.set_button(0, Button::B, true);
        nes.set_button(1, Button::A, true);

        let latch = |nes: &mut Nes| {
            nes.write(0x4016, 1);
            nes.write(0x4016, 0);
            (0..8).map(|_| nes.read(0x4016) & 1).collect::<Vec<u8>>()
        };
        assert_eq!(latch(&mut nes), [0, 1, 0, 0, 0, 0, 0, 0]);

        nes.set_button(0, Button::B, false);
        if let Some(pad) = nes.input_mut(0) {
            pad.set_button(Button::Select, true);
        }
        assert_eq!(latch(&mut nes), [0, 0, 1, 0, 0, 0, 0, 0]);
        assert!(nes.input_mut(1).is_none());
        assert!(nes.input_mut(2).is_none());
    }

    #[test]
    fn eject_clears_state() {
        let mut nes = Nes::new();
        nes.load_rom(&rom(0, 2, &[0xFF])).expect("rom loads");
        nes.write(0x0010, 0x42);
        assert!(nes.eject_cartridge().is_some());
        assert_eq!(nes.read(0x0010), 0);
        assert_eq!(nes.read(0x8000), 0);
        assert_eq!(nes.take_diagnostics().len(), 1);
    }
}
