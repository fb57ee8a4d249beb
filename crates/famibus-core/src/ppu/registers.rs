//! CPU-visible PPU registers and the internal VRAM latches.

mod control;
mod mask;
mod status;
mod vram_addr;
mod vram_registers;

pub use control::Control;
pub use mask::Mask;
pub use status::Status;
pub use vram_addr::VramAddr;
pub use vram_registers::VramRegisters;

use crate::ram::ppu::OamRam;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct Registers {
    pub(crate) control: Control,
    pub(crate) mask: Mask,
    pub(crate) status: Status,
    /// OAM pointer set by `$2003` and advanced by `$2004` writes.
    pub(crate) oam_addr: u8,
    pub(crate) oam: OamRam,
    pub(crate) vram: VramRegisters,
}

impl Registers {
    /// `$2000` write; the nametable bits are also folded into `t`.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.control = Control::from_bits_retain(value);
        self.vram.t.set_nametable(self.control.nametable_index());
    }

    /// `$2002` read: returns the flags, then clears vblank and the write toggle.
    pub(crate) fn read_status(&mut self) -> u8 {
        let value = self.status.bits();
        self.status.remove(Status::VERTICAL_BLANK);
        self.vram.reset_latch();
        value
    }

    pub(crate) fn write_oam_data(&mut self, value: u8) {
        self.oam[usize::from(self.oam_addr)] = value;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    pub(crate) fn read_oam_data(&self) -> u8 {
        self.oam[usize::from(self.oam_addr)]
    }
}
