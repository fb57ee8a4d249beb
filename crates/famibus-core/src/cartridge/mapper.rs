//! Cartridge address translation.
//!
//! A mapper only decides *where* a logical address lands. Decoding which
//! device answers is shared by every board and lives in
//! [`crate::bus::Dispatch`], so a new board implements
//! [`Mapper::translate_address`] and nothing else.

use std::fmt::Debug;

use dyn_clone::DynClone;

use crate::bus::{Dispatch, Origin};

pub mod mapper0;
pub mod provider;

pub use mapper0::Nrom;
pub use provider::Provider;

pub trait Mapper: DynClone + Debug {
    /// iNES mapper number implemented by this board.
    fn mapper_id(&self) -> u16;

    /// Human readable board name for logs.
    fn name(&self) -> &'static str {
        "unknown"
    }

    /// Maps a logical bus address to the address the dispatcher should decode.
    ///
    /// Must be pure: the same input always yields the same output for a given
    /// board configuration.
    fn translate_address(&self, addr: u16, origin: Origin) -> u16;

    /// Translates `addr` and reads the resulting location through `bus`.
    fn read(&self, bus: &mut dyn Dispatch, addr: u16, origin: Origin) -> u8 {
        bus.dispatch_read(self.translate_address(addr, origin), origin)
    }

    /// Translates `addr` and writes the resulting location through `bus`.
    fn write(&self, bus: &mut dyn Dispatch, addr: u16, value: u8, origin: Origin) {
        bus.dispatch_write(self.translate_address(addr, origin), value, origin);
    }
}

dyn_clone::clone_trait_object!(Mapper);
