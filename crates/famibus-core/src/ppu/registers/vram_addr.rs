use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// Field masks of the 15-bit `v`/`t` address.
    ///
    /// ```text
    /// 14 13 12 11 10 9 8 7 6 5 4 3 2 1 0
    /// y  y  y  N  N  Y Y Y Y Y X X X X X
    /// ```
    struct Field: u16 {
        const COARSE_X = 0x001F;
        const COARSE_Y = 0x03E0;
        const NAMETABLE = 0x0C00;
        const FINE_Y = 0x7000;
        const ALL = 0x7FFF;
    }
}

const COARSE_Y_SHIFT: u16 = 5;
const NAMETABLE_SHIFT: u16 = 10;
const FINE_Y_SHIFT: u16 = 12;

/// Internal VRAM address; always kept within 15 bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VramAddr(u16);

impl VramAddr {
    pub fn new(raw: u16) -> Self {
        Self(raw & Field::ALL.bits())
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn set_raw(&mut self, raw: u16) {
        self.0 = raw & Field::ALL.bits();
    }

    pub fn coarse_x(self) -> u8 {
        (self.0 & Field::COARSE_X.bits()) as u8
    }

    pub fn coarse_y(self) -> u8 {
        ((self.0 & Field::COARSE_Y.bits()) >> COARSE_Y_SHIFT) as u8
    }

    pub fn nametable(self) -> u8 {
        ((self.0 & Field::NAMETABLE.bits()) >> NAMETABLE_SHIFT) as u8
    }

    pub fn fine_y(self) -> u8 {
        ((self.0 & Field::FINE_Y.bits()) >> FINE_Y_SHIFT) as u8
    }

    pub fn set_coarse_x(&mut self, value: u8) {
        self.replace(Field::COARSE_X, u16::from(value & 0x1F));
    }

    pub fn set_coarse_y(&mut self, value: u8) {
        self.replace(Field::COARSE_Y, u16::from(value & 0x1F) << COARSE_Y_SHIFT);
    }

    pub fn set_nametable(&mut self, value: u8) {
        self.replace(Field::NAMETABLE, u16::from(value & 0b11) << NAMETABLE_SHIFT);
    }

    pub fn set_fine_y(&mut self, value: u8) {
        self.replace(Field::FINE_Y, u16::from(value & 0b111) << FINE_Y_SHIFT);
    }

    /// Advances the address, wrapping at 15 bits.
    pub fn increment(&mut self, step: u16) {
        self.0 = self.0.wrapping_add(step) & Field::ALL.bits();
    }

    fn replace(&mut self, field: Field, bits: u16) {
        self.0 = (self.0 & !field.bits()) | bits;
    }
}

impl fmt::Debug for VramAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VramAddr")
            .field("raw", &format_args!("{:#06X}", self.0))
            .field("fine_y", &self.fine_y())
            .field("nametable", &self.nametable())
            .field("coarse_y", &self.coarse_y())
            .field("coarse_x", &self.coarse_x())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_setters_touch_only_their_bits() {
        let mut addr = VramAddr::new(0x7FFF);
        addr.set_coarse_x(0);
        assert_eq!(addr.raw(), 0x7FE0);
        addr.set_nametable(0b01);
        assert_eq!(addr.nametable(), 1);
        addr.set_fine_y(2);
        addr.set_coarse_y(3);
        assert_eq!((addr.fine_y(), addr.coarse_y(), addr.coarse_x()), (2, 3, 0));
    }

    #[test]
    fn increment_wraps_at_fifteen_bits() {
        let mut addr = VramAddr::new(0x7FFF);
        addr.increment(1);
        assert_eq!(addr.raw(), 0);
        let mut addr = VramAddr::new(0x7FF0);
        addr.increment(32);
        assert_eq!(addr.raw(), 0x0010);
    }
}
