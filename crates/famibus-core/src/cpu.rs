use std::fmt::Debug;

/// CPU collaborator driven by the system.
///
/// Instruction execution lives outside this crate; the core only needs a way
/// to raise the vblank NMI line once a frame completes.
pub trait Cpu: Debug {
    fn request_nmi(&mut self);
}

/// Counts NMI requests. Handy as a stand-in CPU for headless runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NmiCounter {
    pub requests: u64,
}

impl Cpu for NmiCounter {
    fn request_nmi(&mut self) {
        self.requests += 1;
    }
}
