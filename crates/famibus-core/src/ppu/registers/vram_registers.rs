use super::VramAddr;

/// The `v`/`t`/`x`/`w` latches plus the raw scroll bytes the frame renderer
/// reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VramRegisters {
    /// Current VRAM address (`v`).
    pub v: VramAddr,
    /// Temporary VRAM address (`t`).
    pub t: VramAddr,
    /// Fine X scroll (`x`, 0..7).
    pub x: u8,
    /// Write toggle (`w`): false before the first write of a pair.
    pub w: bool,
    /// Last byte written as the X half of `$2005`.
    pub scroll_x: u8,
    /// Last byte written as the Y half of `$2005`.
    pub scroll_y: u8,
}

impl VramRegisters {
    /// `$2005` write.
    pub fn write_scroll(&mut self, value: u8) {
        if !self.w {
            self.t.set_coarse_x(value >> 3);
            self.x = value & 0b111;
            self.scroll_x = value;
        } else {
            self.t.set_coarse_y(value >> 3);
            self.t.set_fine_y(value & 0b111);
            self.scroll_y = value;
        }
        self.w = !self.w;
    }

    /// `$2006` write. The second write of the pair commits `t` into `v`.
    pub fn write_addr(&mut self, value: u8) {
        if !self.w {
            let hi = u16::from(value & 0b0011_1111) << 8;
            self.t.set_raw(hi | (self.t.raw() & 0x00FF));
        } else {
            self.t.set_raw((self.t.raw() & 0x7F00) | u16::from(value));
            self.v = self.t;
        }
        self.w = !self.w;
    }

    pub fn reset_latch(&mut self) {
        self.w = false;
    }
}
