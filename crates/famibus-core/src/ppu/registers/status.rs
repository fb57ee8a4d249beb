use bitflags::bitflags;

bitflags! {
    /// PPUSTATUS (`$2002`).
    ///
    /// Only the vblank flag is driven by the frame renderer; the two sprite
    /// flags keep whatever state reset left them in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        /// Set when a frame finishes; cleared by reading `$2002`.
        const VERTICAL_BLANK = 0b1000_0000;
    }
}
