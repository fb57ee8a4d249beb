//! APU register file.
//!
//! Sound generation is not emulated. Writes to `$4000-$4013`, `$4015` and
//! `$4017` are latched so that `$4015` reads report which channels are enabled
//! and have had a length value loaded, enough for games that poll channel state.

use bitflags::bitflags;
use tracing::trace;

use crate::{
    memory::{apu as apu_mem, cpu as cpu_mem},
    ram::apu::RegisterRam,
};

bitflags! {
    /// Channel bits shared by `$4015` writes (enable) and reads (active).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Channels: u8 {
        const PULSE_1  = 0b0000_0001;
        const PULSE_2  = 0b0000_0010;
        const TRIANGLE = 0b0000_0100;
        const NOISE    = 0b0000_1000;
        const DMC      = 0b0001_0000;
    }
}

/// Length-load registers, one per length-counted channel.
const LENGTH_LOADS: [(u16, Channels); 4] = [
    (0x4003, Channels::PULSE_1),
    (0x4007, Channels::PULSE_2),
    (0x400B, Channels::TRIANGLE),
    (0x400F, Channels::NOISE),
];

#[derive(Debug, Clone, Default)]
pub struct Apu {
    registers: RegisterRam,
    enabled: Channels,
    loaded: Channels,
}

impl Apu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        let Some(offset) = addr.checked_sub(cpu_mem::APU_REGISTER_BASE) else {
            return;
        };
        let Some(slot) = self.registers.get_mut(usize::from(offset)) else {
            return;
        };
        *slot = value;
        trace!(addr = format_args!("{addr:#06X}"), value, "apu write");

        match addr {
            cpu_mem::APU_STATUS => {
                self.enabled = Channels::from_bits_truncate(value);
                self.loaded &= self.enabled;
            }
            apu_mem::FRAME_COUNTER => {}
            _ => {
                for (load_addr, channel) in LENGTH_LOADS {
                    if addr == load_addr && self.enabled.contains(channel) {
                        self.loaded |= channel;
                    }
                }
            }
        }
    }

    /// `$4015` read: channels that are enabled and running.
    pub fn read_status(&self) -> u8 {
        let dmc = self.enabled & Channels::DMC;
        (self.loaded | dmc).bits()
    }

    /// Last value written to an APU register.
    pub fn register(&self, addr: u16) -> Option<u8> {
        let offset = addr.checked_sub(cpu_mem::APU_REGISTER_BASE)?;
        self.registers.get(usize::from(offset)).copied()
    }
}
