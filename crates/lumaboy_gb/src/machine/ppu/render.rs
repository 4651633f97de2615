use super::{Ppu, OAM_SIZE, VRAM_BANK_SIZE};
use crate::config::PaletteLayer;
use crate::SCREEN_WIDTH;

const MAX_SPRITES_PER_LINE: usize = 10;

/// One OAM entry selected for the current line.
#[derive(Copy, Clone, Debug, Default)]
struct Sprite {
    y: i16,
    x: i16,
    tile: u8,
    attr: u8,
}

impl Ppu {
    /// 2-bit colour of pixel (`x`, `y`) of the tile starting at `offset`.
    #[inline]
    fn tile_pixel(&self, bank: usize, offset: usize, x: u8, y: u8) -> u8 {
        let base = bank * VRAM_BANK_SIZE + offset + y as usize * 2;
        let lo = self.vram[base];
        let hi = self.vram[base + 1];
        let bit = 7 - x;
        (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
    }

    /// Offset of a background/window tile, honouring LCDC bit 4.
    #[inline]
    fn bg_tile_offset(&self, index: u8) -> usize {
        if self.lcdc & 0x10 != 0 {
            index as usize * 16
        } else {
            (0x1000 + index as i8 as isize * 16) as usize
        }
    }

    #[inline]
    fn dmg_color(&self, layer: PaletteLayer, palette: u8, color_id: u8) -> u16 {
        self.dmg_colors[layer as usize][((palette >> (color_id * 2)) & 0x03) as usize]
    }

    /// Render LY into the back buffer.
    pub(super) fn render_line(&mut self) {
        let ly = self.ly;
        if ly == self.wy {
            self.window_triggered = true;
        }

        let mut colors = [0u16; SCREEN_WIDTH];
        let mut bg_ids = [0u8; SCREEN_WIDTH];
        let mut bg_priority = [false; SCREEN_WIDTH];

        let bg_enabled = self.lcdc & 0x01 != 0;
        if self.cgb_mode || bg_enabled {
            self.render_background(&mut colors, &mut bg_ids, &mut bg_priority);
        } else {
            colors.fill(self.dmg_colors()[0]);
        }

        if self.lcdc & 0x02 != 0 {
            self.render_sprites(&mut colors, &bg_ids, &bg_priority);
        }

        self.frame.line_mut(ly as usize).copy_from_slice(&colors);
    }

    fn render_background(
        &mut self,
        colors: &mut [u16; SCREEN_WIDTH],
        bg_ids: &mut [u8; SCREEN_WIDTH],
        bg_priority: &mut [bool; SCREEN_WIDTH],
    ) {
        let ly = self.ly;
        let window_enabled = self.lcdc & 0x20 != 0 && self.window_triggered && self.wx <= 166;
        let window_start = self.wx as i16 - 7;
        let bg_map = if self.lcdc & 0x08 != 0 { 0x1C00 } else { 0x1800 };
        let window_map = if self.lcdc & 0x40 != 0 { 0x1C00 } else { 0x1800 };
        let mut window_drawn = false;

        for x in 0..SCREEN_WIDTH {
            let in_window = window_enabled && x as i16 >= window_start;
            let (map, px, py) = if in_window {
                window_drawn = true;
                (window_map, (x as i16 - window_start) as u8, self.window_line)
            } else {
                (
                    bg_map,
                    self.scx.wrapping_add(x as u8),
                    self.scy.wrapping_add(ly),
                )
            };

            let map_index = map + (py as usize / 8) * 32 + px as usize / 8;
            let tile = self.vram[map_index];
            let attr = if self.cgb_mode {
                self.vram[VRAM_BANK_SIZE + map_index]
            } else {
                0
            };

            let mut tx = px & 7;
            let mut ty = py & 7;
            if attr & 0x20 != 0 {
                tx = 7 - tx;
            }
            if attr & 0x40 != 0 {
                ty = 7 - ty;
            }
            let bank = usize::from(attr & 0x08 != 0);
            let id = self.tile_pixel(bank, self.bg_tile_offset(tile), tx, ty);

            bg_ids[x] = id;
            bg_priority[x] = attr & 0x80 != 0;
            colors[x] = if self.cgb_mode {
                self.bg_palette.color(attr & 0x07, id)
            } else {
                self.dmg_color(PaletteLayer::Background, self.bgp, id)
            };
        }

        if window_drawn {
            self.window_line = self.window_line.wrapping_add(1);
        }
    }

    /// Up to ten sprites overlapping LY, in drawing priority order.
    fn line_sprites(&self, height: i16) -> ([Sprite; MAX_SPRITES_PER_LINE], usize) {
        let ly = self.ly as i16;
        let mut sprites = [Sprite::default(); MAX_SPRITES_PER_LINE];
        let mut count = 0;
        for entry in self.oam[..OAM_SIZE].chunks_exact(4) {
            let y = entry[0] as i16 - 16;
            if ly < y || ly >= y + height {
                continue;
            }
            sprites[count] = Sprite {
                y,
                x: entry[1] as i16 - 8,
                tile: entry[2],
                attr: entry[3],
            };
            count += 1;
            if count == MAX_SPRITES_PER_LINE {
                break;
            }
        }
        // DMG: lower X wins, ties go to the earlier OAM entry (stable
        // sort). CGB mode uses OAM order alone.
        if !self.cgb_mode {
            sprites[..count].sort_by_key(|s| s.x);
        }
        (sprites, count)
    }

    fn render_sprites(
        &self,
        colors: &mut [u16; SCREEN_WIDTH],
        bg_ids: &[u8; SCREEN_WIDTH],
        bg_priority: &[bool; SCREEN_WIDTH],
    ) {
        let tall = self.lcdc & 0x04 != 0;
        let height: i16 = if tall { 16 } else { 8 };
        let (sprites, count) = self.line_sprites(height);
        if count == 0 {
            return;
        }
        let ly = self.ly as i16;
        // CGB with LCDC.0 clear: sprites are always on top.
        let bg_master_priority = !self.cgb_mode || self.lcdc & 0x01 != 0;

        for x in 0..SCREEN_WIDTH {
            let sx = x as i16;
            for sprite in &sprites[..count] {
                if sx < sprite.x || sx >= sprite.x + 8 {
                    continue;
                }

                let mut row = (ly - sprite.y) as u8;
                if sprite.attr & 0x40 != 0 {
                    row = height as u8 - 1 - row;
                }
                let mut col = (sx - sprite.x) as u8;
                if sprite.attr & 0x20 != 0 {
                    col = 7 - col;
                }
                let tile = if tall { sprite.tile & 0xFE } else { sprite.tile };
                let bank = usize::from(self.cgb_mode && sprite.attr & 0x08 != 0);
                let offset = tile as usize * 16 + (row as usize / 8) * 16;
                let id = self.tile_pixel(bank, offset, col, row & 7);
                if id == 0 {
                    continue;
                }

                let behind_bg = sprite.attr & 0x80 != 0 || (self.cgb_mode && bg_priority[x]);
                if bg_master_priority && behind_bg && bg_ids[x] != 0 {
                    break;
                }

                colors[x] = if self.cgb_mode {
                    self.obj_palette.color(sprite.attr & 0x07, id)
                } else {
                    let (layer, palette) = if sprite.attr & 0x10 != 0 {
                        (PaletteLayer::Object1, self.obp1)
                    } else {
                        (PaletteLayer::Object0, self.obp0)
                    };
                    self.dmg_color(layer, palette, id)
                };
                break;
            }
        }
    }
}
