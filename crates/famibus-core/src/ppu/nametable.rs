use crate::{cartridge::header::Mirroring, memory::ppu as ppu_mem};

/// Folds a PPU address in `$2000-$2FFF` onto an offset into the 2 KiB CIRAM.
///
/// The 4 KiB window holds four logical 1 KiB tables (quadrants):
///
/// ```text
/// | 0 $2000 | 1 $2400 |
/// | 2 $2800 | 3 $2C00 |
/// ```
///
/// Vertical arrangement maps quadrants 0/2 to physical table 0 and 1/3 to
/// table 1; horizontal maps 0/1 to table 0 and 2/3 to table 1.
pub fn mirror_nametable(addr: u16, arrangement: Mirroring) -> usize {
    let relative = addr.wrapping_sub(ppu_mem::NAMETABLE_BASE) & 0x0FFF;
    let quadrant = relative / ppu_mem::NAMETABLE_SIZE;
    let offset = relative % ppu_mem::NAMETABLE_SIZE;

    let physical = match arrangement {
        Mirroring::Vertical => quadrant & 0b01,
        Mirroring::Horizontal => quadrant >> 1,
    };

    usize::from(physical * ppu_mem::NAMETABLE_SIZE + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUADRANTS: [u16; 4] = [0x2000, 0x2400, 0x2800, 0x2C00];

    #[test]
    fn vertical_pairs_left_and_right() {
        let tables: Vec<usize> = QUADRANTS
            .iter()
            .map(|&base| mirror_nametable(base + 0x15, Mirroring::Vertical))
            .collect();
        assert_eq!(tables, [0x015, 0x415, 0x015, 0x415]);
    }

    #[test]
    fn horizontal_pairs_top_and_bottom() {
        let tables: Vec<usize> = QUADRANTS
            .iter()
            .map(|&base| mirror_nametable(base + 0x3FF, Mirroring::Horizontal))
            .collect();
        assert_eq!(tables, [0x3FF, 0x3FF, 0x7FF, 0x7FF]);
    }
}
