use core::ops::{Deref, DerefMut};

/// Fixed-size zero-initialised memory block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ram<const N: usize>(Box<[u8; N]>);

pub mod cpu {
    use crate::memory::cpu as cpu_mem;

    pub type Ram = super::Ram<{ cpu_mem::INTERNAL_RAM_SIZE }>;
}

pub mod ppu {
    use crate::memory::ppu as ppu_mem;

    pub type Ciram = super::Ram<{ ppu_mem::CIRAM_SIZE }>;
    pub type PaletteRam = super::Ram<{ ppu_mem::PALETTE_RAM_SIZE }>;
    pub type OamRam = super::Ram<{ ppu_mem::OAM_RAM_SIZE }>;
}

pub mod apu {
    use crate::memory::apu as apu_mem;

    pub type RegisterRam = super::Ram<{ apu_mem::REGISTER_SPACE }>;
}

impl<const N: usize> Ram<N> {
    pub fn new() -> Self {
        Self(Box::new([0; N]))
    }

    /// Zeroes every byte.
    pub fn clear(&mut self) {
        self.0.fill(0);
    }

    /// Replaces the whole block from `src`, which must be exactly `N` bytes.
    pub fn load(&mut self, src: &[u8; N]) {
        self.0.copy_from_slice(src);
    }
}

impl<const N: usize> Default for Ram<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Deref for Ram<N> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl<const N: usize> DerefMut for Ram<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut_slice()
    }
}
