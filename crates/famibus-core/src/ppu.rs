//! Picture processing unit: register file, video memory and the frame renderer.
//!
//! The CPU reaches the PPU only through the eight registers at `$2000-$2007`
//! (mirrored up to `$3FFF`) and the OAM DMA port at `$4014`. Internally the PPU
//! owns a 14-bit address space of its own:
//!
//! ```text
//! $0000-$1FFF  pattern tables (cartridge CHR, cached at insertion)
//! $2000-$2FFF  four logical nametables folded onto 2 KiB CIRAM
//! $3000-$3EFF  not decoded
//! $3F00-$3FFF  palette RAM, 32 bytes mirrored every 32
//! ```
//!
//! Rendering is done once per frame by [`Ppu::render_frame`] rather than per
//! dot; see [`render`] for the pixel pipeline.

use tracing::{debug, trace};

use crate::{
    bus::{BusFault, Diagnostics, Origin},
    cartridge::header::Mirroring,
    memory::ppu::{self as ppu_mem, Register},
    ppu::{
        buffer::FrameBuffer,
        nametable::mirror_nametable,
        palette::{Color, Palette},
        pattern::PatternTables,
        registers::{Control, Mask, Registers, Status, VramAddr},
    },
    ram::ppu::{Ciram, PaletteRam},
};

pub mod buffer;
pub mod nametable;
pub mod palette;
pub mod pattern;
pub mod registers;
mod render;
pub mod sprite;
pub mod viewer;

/// Visible frame width in pixels.
pub const SCREEN_WIDTH: usize = 256;
/// Visible frame height in pixels.
pub const SCREEN_HEIGHT: usize = 240;

/// Where a 14-bit PPU address lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VramTarget {
    Pattern(u16),
    Nametable(usize),
    Palette(usize),
    Unmapped,
}

#[derive(Debug, Clone)]
pub struct Ppu {
    registers: Registers,
    ciram: Ciram,
    palette_ram: PaletteRam,
    mirroring: Mirroring,
    patterns: PatternTables,
    palette: Palette,
    frame: FrameBuffer,
    nametables_dirty: bool,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            registers: Registers::default(),
            ciram: Ciram::new(),
            palette_ram: PaletteRam::new(),
            mirroring: Mirroring::default(),
            patterns: PatternTables::default(),
            palette: Palette::default(),
            frame: FrameBuffer::new(),
            nametables_dirty: true,
        }
    }

    /// Clears registers and video memory. The pattern cache, arrangement and
    /// master palette belong to the cartridge/host and survive.
    pub(crate) fn reset(&mut self) {
        self.registers = Registers::default();
        self.ciram.clear();
        self.palette_ram.clear();
        self.frame.clear(Color::BLACK);
        self.nametables_dirty = true;
    }

    /// Installs the nametable arrangement of a newly inserted cartridge.
    pub(crate) fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
        self.nametables_dirty = true;
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    /// Replaces the cached pattern tables with `chr` and re-decodes every tile.
    pub(crate) fn load_pattern_data(&mut self, chr: &[u8]) {
        self.patterns.load(chr);
        self.nametables_dirty = true;
        debug!(bytes = chr.len(), "pattern tables reloaded");
    }

    pub fn patterns(&self) -> &PatternTables {
        &self.patterns
    }

    pub(crate) fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.nametables_dirty = true;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// CPU read of register `reg`.
    pub(crate) fn cpu_read(&mut self, reg: Register, diagnostics: &mut Diagnostics) -> u8 {
        match reg {
            Register::Status => self.registers.read_status(),
            Register::OamData => self.registers.read_oam_data(),
            Register::Data => {
                let addr = self.registers.vram.v.raw();
                let value = self.read_vram(addr, diagnostics);
                self.advance_vram_addr();
                value
            }
            _ => {
                trace!(?reg, "read of write-only PPU register");
                0
            }
        }
    }

    /// CPU write of `value` to register `reg`.
    pub(crate) fn cpu_write(
        &mut self,
        reg: Register,
        value: u8,
        diagnostics: &mut Diagnostics,
    ) {
        match reg {
            Register::Control => self.registers.write_control(value),
            Register::Mask => self.registers.mask = Mask::from_bits_retain(value),
            Register::Status => trace!(value, "write to read-only PPUSTATUS ignored"),
            Register::OamAddr => self.registers.oam_addr = value,
            Register::OamData => self.registers.write_oam_data(value),
            Register::Scroll => self.registers.vram.write_scroll(value),
            Register::Addr => self.registers.vram.write_addr(value),
            Register::Data => {
                let addr = self.registers.vram.v.raw();
                self.write_vram(addr, value, diagnostics);
                self.advance_vram_addr();
            }
        }
    }

    /// OAM DMA: replaces all 256 OAM bytes at once.
    pub(crate) fn write_oam_page(&mut self, page: &[u8; ppu_mem::OAM_RAM_SIZE]) {
        self.registers.oam.load(page);
    }

    fn advance_vram_addr(&mut self) {
        let step = self.registers.control.vram_increment();
        self.registers.vram.v.increment(step);
    }

    fn target(&self, addr: u16) -> VramTarget {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0x0000..ppu_mem::PATTERN_SPACE_END => VramTarget::Pattern(addr),
            ppu_mem::NAMETABLE_BASE..ppu_mem::NAMETABLE_END => {
                VramTarget::Nametable(mirror_nametable(addr, self.mirroring))
            }
            ppu_mem::PALETTE_BASE..=ppu_mem::VRAM_MIRROR_MASK => {
                VramTarget::Palette(palette_index(addr))
            }
            _ => VramTarget::Unmapped,
        }
    }

    /// Side-effect free VRAM read used by the renderer and debug views.
    fn peek_vram(&self, addr: u16) -> u8 {
        match self.target(addr) {
            VramTarget::Pattern(a) => self.patterns.byte(a).unwrap_or(0),
            VramTarget::Nametable(i) => self.ciram[i],
            VramTarget::Palette(i) => self.palette_ram[i],
            VramTarget::Unmapped => 0,
        }
    }

    fn read_vram(&self, addr: u16, diagnostics: &mut Diagnostics) -> u8 {
        if self.target(addr) == VramTarget::Unmapped {
            diagnostics.report(BusFault::UnmappedAccess {
                addr,
                origin: Origin::Ppu,
            });
        }
        self.peek_vram(addr)
    }

    fn write_vram(&mut self, addr: u16, value: u8, diagnostics: &mut Diagnostics) {
        match self.target(addr) {
            VramTarget::Pattern(_) => diagnostics.report(BusFault::ReadOnlyRegionWrite {
                addr,
                value,
                origin: Origin::Ppu,
            }),
            VramTarget::Nametable(i) => {
                self.ciram[i] = value;
                self.nametables_dirty = true;
            }
            VramTarget::Palette(i) => {
                self.palette_ram[i] = value;
                self.nametables_dirty = true;
            }
            VramTarget::Unmapped => diagnostics.report(BusFault::UnmappedAccess {
                addr,
                origin: Origin::Ppu,
            }),
        }
    }

    /// Master-palette colour stored at palette address `addr`.
    fn palette_color(&self, addr: u16) -> Color {
        self.palette.color(self.palette_ram[palette_index(addr)])
    }

    /// Four colours of background palette `selector`; entry 0 is always the
    /// universal background colour at `$3F00`.
    fn background_colors(&self, selector: u8) -> [Color; 4] {
        let base = ppu_mem::PALETTE_BASE + u16::from(selector & 0b11) * 4;
        [
            self.palette_color(ppu_mem::PALETTE_BASE),
            self.palette_color(base + 1),
            self.palette_color(base + 2),
            self.palette_color(base + 3),
        ]
    }

    /// Four colours of sprite palette `selector`; entry 0 is never drawn.
    fn sprite_colors(&self, selector: u8) -> [Color; 4] {
        let base = ppu_mem::SPRITE_PALETTE_BASE + u16::from(selector & 0b11) * 4;
        [
            Color::BLACK,
            self.palette_color(base + 1),
            self.palette_color(base + 2),
            self.palette_color(base + 3),
        ]
    }

    pub fn control(&self) -> Control {
        self.registers.control
    }

    pub fn mask(&self) -> Mask {
        self.registers.mask
    }

    pub fn status(&self) -> Status {
        self.registers.status
    }

    /// Current VRAM address (`v`).
    pub fn vram_addr(&self) -> VramAddr {
        self.registers.vram.v
    }

    /// Temporary VRAM address (`t`).
    pub fn temp_vram_addr(&self) -> VramAddr {
        self.registers.vram.t
    }

    pub fn fine_x(&self) -> u8 {
        self.registers.vram.x
    }

    /// `true` when the next `$2005`/`$2006` write is the second of a pair.
    pub fn write_latch(&self) -> bool {
        self.registers.vram.w
    }

    /// Raw scroll bytes as last written through `$2005`.
    pub fn scroll(&self) -> (u8, u8) {
        (self.registers.vram.scroll_x, self.registers.vram.scroll_y)
    }

    pub fn oam_addr(&self) -> u8 {
        self.registers.oam_addr
    }

    pub fn oam(&self) -> &[u8] {
        &self.registers.oam
    }

    pub fn ciram(&self) -> &[u8] {
        &self.ciram
    }

    pub fn palette_ram(&self) -> &[u8] {
        &self.palette_ram
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Set by nametable/palette writes until a view clears it.
    pub fn nametables_dirty(&self) -> bool {
        self.nametables_dirty
    }

    pub(crate) fn clear_nametables_dirty(&mut self) {
        self.nametables_dirty = false;
    }
}

/// Index into the 32-byte palette RAM for any address in `$3F00-$3FFF`.
///
/// Entries `$3F10/$3F14/$3F18/$3F1C` share storage with `$3F00/$3F04/$3F08/$3F0C`.
fn palette_index(addr: u16) -> usize {
    let index = usize::from(addr.wrapping_sub(ppu_mem::PALETTE_BASE) % ppu_mem::PALETTE_STRIDE);
    if index >= 0x10 && index % 4 == 0 {
        index - 0x10
    } else {
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_addr(ppu: &mut Ppu, addr: u16, diagnostics: &mut Diagnostics) {
        ppu.cpu_write(Register::Addr, (addr >> 8) as u8, diagnostics);
        ppu.cpu_write(Register::Addr, addr as u8, diagnostics);
    }

    #[test]
    fn data_port_increments_by_one_or_thirty_two() {
        let mut ppu = Ppu::new();
        let mut diagnostics = Diagnostics::new();

        set_addr(&mut ppu, 0x2000, &mut diagnostics);
        ppu.cpu_write(Register::Data, 0x11, &mut diagnostics);
        assert_eq!(ppu.vram_addr().raw(), 0x2001);

        ppu.cpu_write(Register::Control, Control::INCREMENT_32.bits(), &mut diagnostics);
        ppu.cpu_read(Register::Data, &mut diagnostics);
        assert_eq!(ppu.vram_addr().raw(), 0x2021);
        assert_eq!(diagnostics.total(), 0);
    }

    #[test]
    fn control_write_sets_nametable_bits_of_t() {
        let mut ppu = Ppu::new();
        let mut diagnostics = Diagnostics::new();
        ppu.cpu_write(Register::Control, 0b1000_0011, &mut diagnostics);
        assert_eq!(ppu.temp_vram_addr().nametable(), 3);
        assert!(ppu.control().nmi_enabled());
    }

    #[test]
    fn palette_mirrors_every_thirty_two_bytes() {
        let mut ppu = Ppu::new();
        let mut diagnostics = Diagnostics::new();

        set_addr(&mut ppu, 0x3F25, &mut diagnostics);
        ppu.cpu_write(Register::Data, 0x2A, &mut diagnostics);
        assert_eq!(ppu.palette_ram()[0x05], 0x2A);

        set_addr(&mut ppu, 0x3F10, &mut diagnostics);
        ppu.cpu_write(Register::Data, 0x0F, &mut diagnostics);
        assert_eq!(ppu.palette_ram()[0x00], 0x0F);

        set_addr(&mut ppu, 0x3FE5, &mut diagnostics);
        assert_eq!(ppu.cpu_read(Register::Data, &mut diagnostics), 0x2A);
    }

    #[test]
    fn status_read_clears_vblank_and_latch() {
        let mut ppu = Ppu::new();
        let mut diagnostics = Diagnostics::new();
        ppu.registers.status.insert(Status::VERTICAL_BLANK);
        ppu.cpu_write(Register::Scroll, 0x10, &mut diagnostics);
        assert!(ppu.write_latch());

        let status = ppu.cpu_read(Register::Status, &mut diagnostics);
        assert_eq!(status & 0x80, 0x80);
        assert!(!ppu.write_latch());
        assert!(!ppu.status().contains(Status::VERTICAL_BLANK));
    }

    #[test]
    fn oam_data_writes_advance_address() {
        let mut ppu = Ppu::new();
        let mut diagnostics = Diagnostics::new();
        ppu.cpu_write(Register::OamAddr, 0xFF, &mut diagnostics);
        ppu.cpu_write(Register::OamData, 0xAB, &mut diagnostics);
        ppu.cpu_write(Register::OamData, 0xCD, &mut diagnostics);
        assert_eq!(ppu.oam()[0xFF], 0xAB);
        assert_eq!(ppu.oam()[0x00], 0xCD);
        assert_eq!(ppu.oam_addr(), 0x01);

        ppu.cpu_write(Register::OamAddr, 0xFF, &mut diagnostics);
        assert_eq!(ppu.cpu_read(Register::OamData, &mut diagnostics), 0xAB);
    }

    #[test]
    fn undecoded_and_read_only_vram_report_faults() {
        let mut ppu = Ppu::new();
        let mut diagnostics = Diagnostics::new();

        set_addr(&mut ppu, 0x3000, &mut diagnostics);
        assert_eq!(ppu.cpu_read(Register::Data, &mut diagnostics), 0);
        set_addr(&mut ppu, 0x0010, &mut diagnostics);
        ppu.cpu_write(Register::Data, 0x99, &mut diagnostics);

        let faults = diagnostics.take();
        assert_eq!(
            faults,
            [
                BusFault::UnmappedAccess {
                    addr: 0x3000,
                    origin: Origin::Ppu
                },
                BusFault::ReadOnlyRegionWrite {
                    addr: 0x0010,
                    value: 0x99,
                    origin: Origin::Ppu
                },
            ]
        );
    }

    #[test]
    fn nametable_writes_follow_arrangement_and_mark_dirty() {
        let mut ppu = Ppu::new();
        let mut diagnostics = Diagnostics::new();
        ppu.set_mirroring(Mirroring::Vertical);
        ppu.clear_nametables_dirty();

        set_addr(&mut ppu, 0x2C05, &mut diagnostics);
        ppu.cpu_write(Register::Data, 0x77, &mut diagnostics);
        assert!(ppu.nametables_dirty());
        assert_eq!(ppu.ciram()[0x405], 0x77);

        set_addr(&mut ppu, 0x2405, &mut diagnostics);
        assert_eq!(ppu.cpu_read(Register::Data, &mut diagnostics), 0x77);
    }
}
