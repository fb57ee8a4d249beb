use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, warn};

use super::Origin;

/// Number of faults retained for [`Diagnostics::take`].
pub const DIAGNOSTIC_CAPACITY: usize = 64;

/// Non-fatal bus fault. The access degrades to open bus (reads return 0) or is
/// dropped (writes), and emulation continues.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusFault {
    #[error("unmapped {origin} access at {addr:#06X}")]
    UnmappedAccess { addr: u16, origin: Origin },
    #[error("PPU-origin write of {value:#04X} to {addr:#06X} dropped")]
    IllegalPpuWrite { addr: u16, value: u8 },
    #[error("{origin} write of {value:#04X} to read-only {addr:#06X} dropped")]
    ReadOnlyRegionWrite { addr: u16, value: u8, origin: Origin },
}

impl BusFault {
    pub fn addr(&self) -> u16 {
        match *self {
            Self::UnmappedAccess { addr, .. }
            | Self::IllegalPpuWrite { addr, .. }
            | Self::ReadOnlyRegionWrite { addr, .. } => addr,
        }
    }
}

/// Bounded log of recent bus faults plus a running total.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    recent: VecDeque<BusFault>,
    total: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, fault: BusFault) {
        match fault {
            BusFault::UnmappedAccess { .. } => debug!(%fault, "bus fault"),
            _ => warn!(%fault, "bus fault"),
        }
        if self.recent.len() == DIAGNOSTIC_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(fault);
        self.total += 1;
    }

    /// Drains the retained faults, oldest first.
    pub fn take(&mut self) -> Vec<BusFault> {
        self.recent.drain(..).collect()
    }

    /// Faults reported since construction, including ones evicted from the log.
    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_bounded_but_total_keeps_counting() {
        let mut diagnostics = Diagnostics::new();
        for addr in 0..(DIAGNOSTIC_CAPACITY as u16 + 10) {
            diagnostics.report(BusFault::UnmappedAccess {
                addr,
                origin: Origin::Cpu,
            });
        }

        let faults = diagnostics.take();
        assert_eq!(faults.len(), DIAGNOSTIC_CAPACITY);
        assert_eq!(faults[0].addr(), 10);
        assert_eq!(diagnostics.total(), DIAGNOSTIC_CAPACITY as u64 + 10);
        assert!(diagnostics.take().is_empty());
    }

    #[test]
    fn faults_render_addresses_in_hex() {
        let fault = BusFault::ReadOnlyRegionWrite {
            addr: 0x8000,
            value: 0x12,
            origin: Origin::Cpu,
        };
        assert_eq!(fault.to_string(), "CPU write of 0x12 to read-only 0x8000 dropped");
    }
}
