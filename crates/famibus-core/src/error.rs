use thiserror::Error;

/// Fatal errors raised while loading a cartridge or configuring the core.
///
/// Bus traffic never produces these; see [`crate::bus::BusFault`] for the
/// non-fatal diagnostics reported during emulation.
#[derive(Error, Debug)]
pub enum Error {
    /// The first four bytes are not `"NES\x1A"`.
    #[error("missing NES signature")]
    BadSignature,
    /// A section (header/trainer/PRG/CHR) is shorter than the header advertises.
    #[error("{section} section expected {expected} bytes, got {actual}")]
    TooShort {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    /// No built-in mapper or provider handles this id.
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u16),
    /// Palette blobs must carry 64 RGB triplets.
    #[error("palette expected 192 bytes, got {0}")]
    InvalidPaletteSize(usize),
    #[error("i/o error while reading cartridge: {0}")]
    Io(#[from] std::io::Error),
}
