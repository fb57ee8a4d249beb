//! Per-frame pixel pipeline.
//!
//! 1. Background: every visible tile cell, plus one column and one row of
//!    slack for fine scrolling, is drawn from the nametables at the scroll
//!    position latched through `$2005`.
//! 2. Sprites: scanline by scanline, OAM is searched for up to eight sprites
//!    covering the current line. The set found on line `N` is drawn on line
//!    `N + 1`, which reproduces the hardware's one-line evaluation latency: a
//!    sprite with Y = 20 first shows up on scanline 21.
//! 3. Vblank is flagged and the caller learns whether NMI is enabled.

use crate::{
    memory::ppu as ppu_mem,
    ppu::{
        Ppu, SCREEN_HEIGHT, SCREEN_WIDTH,
        palette::Color,
        registers::Status,
        sprite::{Sprite, SpriteAttributes},
    },
};

/// Tile columns in a nametable.
const NAMETABLE_COLUMNS: usize = 32;
/// Tile rows in a nametable (the remaining bytes hold attributes).
const NAMETABLE_ROWS: usize = 30;

impl Ppu {
    /// Draws one full frame into the framebuffer.
    ///
    /// Returns `true` when the control register asks for an NMI at vblank.
    pub(crate) fn render_frame(&mut self) -> bool {
        self.registers.status.remove(Status::VERTICAL_BLANK);

        let mut opaque = vec![false; SCREEN_WIDTH * SCREEN_HEIGHT];
        self.render_background(&mut opaque);
        self.render_sprites(&opaque);

        self.registers.status.insert(Status::VERTICAL_BLANK);
        self.registers.control.nmi_enabled()
    }

    fn render_background(&mut self, opaque: &mut [bool]) {
        let control = self.registers.control;
        let (scroll_x, scroll_y) = self.scroll();
        let (coarse_x, fine_x) = (usize::from(scroll_x >> 3), i32::from(scroll_x & 0b111));
        let (coarse_y, fine_y) = (usize::from(scroll_y >> 3), i32::from(scroll_y & 0b111));
        let table = control.background_table();
        let base_nametable = control.nametable_index();

        for ty in 0..=NAMETABLE_ROWS {
            for tx in 0..=NAMETABLE_COLUMNS {
                let column = coarse_x + tx;
                let row = coarse_y + ty;
                // Scrolling past the right or bottom edge continues in the
                // neighbouring logical nametable.
                let wrap = ((column / NAMETABLE_COLUMNS) & 1) | (((row / NAMETABLE_ROWS) & 1) << 1);
                let nametable = base_nametable ^ wrap as u8;
                let (column, row) = (column % NAMETABLE_COLUMNS, row % NAMETABLE_ROWS);

                let (tile_index, colors) = self.background_cell(nametable, column, row);
                let tile = self.patterns.tile(table, tile_index);

                for (i, &value) in tile.iter().enumerate() {
                    let x = (tx * 8 + i % 8) as i32 - fine_x;
                    let y = (ty * 8 + i / 8) as i32 - fine_y;
                    if !(0..SCREEN_WIDTH as i32).contains(&x) || !(0..SCREEN_HEIGHT as i32).contains(&y)
                    {
                        continue;
                    }
                    self.frame.set_pixel(x, y, colors[usize::from(value)]);
                    opaque[y as usize * SCREEN_WIDTH + x as usize] = value != 0;
                }
            }
        }
    }

    /// Tile index and resolved colours of one nametable cell.
    pub(super) fn background_cell(
        &self,
        nametable: u8,
        column: usize,
        row: usize,
    ) -> (u8, [Color; 4]) {
        let base = ppu_mem::NAMETABLE_BASE + u16::from(nametable & 0b11) * ppu_mem::NAMETABLE_SIZE;
        let tile_index = self.peek_vram(base + (row * NAMETABLE_COLUMNS + column) as u16);
        let attribute =
            self.peek_vram(base + ppu_mem::ATTRIBUTE_OFFSET + ((row / 4) * 8 + column / 4) as u16);
        (tile_index, self.background_colors(attribute_selector(attribute, column, row)))
    }

    fn render_sprites(&mut self, opaque: &[bool]) {
        let control = self.registers.control;
        let height = control.sprite_height();
        let sprite_table = control.sprite_table();

        // Sprites found while evaluating the previous line. Empty at the top
        // of every frame.
        let mut pending: Vec<Sprite> = Vec::with_capacity(ppu_mem::SPRITES_PER_LINE);

        for line in 0..SCREEN_HEIGHT as u16 {
            // Lower OAM indices win, so they are drawn last.
            for sprite in pending.iter().rev() {
                self.draw_sprite_row(sprite, line, height, sprite_table, opaque);
            }
            pending = self.evaluate_sprites(line, height);
        }
    }

    /// Up to eight sprites, in OAM order, whose rows cover `line`.
    fn evaluate_sprites(&self, line: u16, height: u16) -> Vec<Sprite> {
        self.registers
            .oam
            .chunks_exact(Sprite::BYTES)
            .map(|b| Sprite::from_bytes([b[0], b[1], b[2], b[3]]))
            .filter(|sprite| sprite.covers(line, height))
            .take(ppu_mem::SPRITES_PER_LINE)
            .collect()
    }

    /// Draws the row of `sprite` that was evaluated on `line - 1`.
    fn draw_sprite_row(
        &mut self,
        sprite: &Sprite,
        line: u16,
        height: u16,
        sprite_table: usize,
        opaque: &[bool],
    ) {
        let attributes = sprite.attributes;
        let mut row = line - 1 - u16::from(sprite.y);
        if attributes.contains(SpriteAttributes::FLIP_VERTICAL) {
            row = height - 1 - row;
        }

        let (table, tile_index) = sprite.tile_for_row(row, height, sprite_table);
        let colors = self.sprite_colors(attributes.palette());
        let flip_h = attributes.contains(SpriteAttributes::FLIP_HORIZONTAL);
        let behind = attributes.contains(SpriteAttributes::BEHIND_BACKGROUND);
        let pixels = &self.patterns.tile(table, tile_index)[usize::from(row % 8) * 8..][..8];
        let y = usize::from(line);

        for col in 0..8 {
            let value = pixels[if flip_h { 7 - col } else { col }];
            let x = usize::from(sprite.x) + col;
            if value == 0 || x >= SCREEN_WIDTH {
                continue;
            }
            if behind && opaque[y * SCREEN_WIDTH + x] {
                continue;
            }
            self.frame
                .set_pixel(x as i32, y as i32, colors[usize::from(value)]);
        }
    }
}

/// Palette selector for a cell from its attribute byte.
///
/// Each attribute byte covers a 4x4-tile block split into 2x2-tile quadrants:
/// bits 0-1 top-left, 2-3 top-right, 4-5 bottom-left, 6-7 bottom-right.
fn attribute_selector(attribute: u8, column: usize, row: usize) -> u8 {
    let quadrant = (column / 2) % 2 + ((row / 2) % 2) * 2;
    (attribute >> (quadrant * 2)) & 0b11
}
