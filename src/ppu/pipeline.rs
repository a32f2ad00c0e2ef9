//! Scanline Compositor
//!
//! Renders one native scanline at a time into the scaled [`FrameBuffer`]:
//! OAM scan, background or window layer, then sprites on top.

use crate::bus::{VideoMemory, OAM_START, VRAM_START};
use crate::common::{plane_color, Byte, Word};
use crate::frame::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::lcd::Lcd;

use super::{Sprite, MAX_SPRITES_PER_LINE, OAM_ENTRIES};

/// Per-line rendering state and the output frame
#[derive(Debug, Clone)]
pub struct Compositor {
    /// Output frame (display color indices)
    frame: FrameBuffer,
    /// Raw 2-bit background color of each native column on the current line
    bg_line: [Byte; SCREEN_WIDTH],
    /// Sprites on the current line, in drawing order
    line_sprites: Vec<Sprite>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            frame: FrameBuffer::new(),
            bg_line: [0; SCREEN_WIDTH],
            line_sprites: Vec::with_capacity(MAX_SPRITES_PER_LINE),
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn clear(&mut self) {
        self.frame.clear();
        self.bg_line.fill(0);
        self.line_sprites.clear();
    }

    /// Sprites selected for the most recently rendered line, in drawing order
    pub fn line_sprites(&self) -> &[Sprite] {
        &self.line_sprites
    }

    /// Render a single scanline
    pub fn render_line<M: VideoMemory + ?Sized>(&mut self, lcd: &Lcd, line: u8, mem: &M) {
        if line as usize >= SCREEN_HEIGHT {
            return;
        }

        self.scan_oam(lcd, line, mem);
        self.draw_bg_and_window(lcd, line, mem);

        if lcd.sprites_enabled() {
            self.draw_sprites(lcd, line, mem);
        }
    }

    /// Scan OAM for sprites on the given line
    ///
    /// The first ten hits in table order are kept, then stably ordered by
    /// descending X so the leftmost sprite is drawn last. Sprites sharing an
    /// X stay in table order, so the higher OAM index ends up on top.
    fn scan_oam<M: VideoMemory + ?Sized>(&mut self, lcd: &Lcd, line: u8, mem: &M) {
        self.line_sprites.clear();

        let line = line as i16;
        let height = lcd.sprite_height() as i16;

        for index in 0..OAM_ENTRIES {
            let base = OAM_START + index as Word * 4;
            let y = mem.read(base) as i16 - 16;
            if line < y || line >= y + height {
                continue;
            }

            self.line_sprites.push(Sprite {
                index: index as u8,
                y,
                x: mem.read(base + 1) as i16 - 8,
                tile: mem.read(base + 2),
                flags: mem.read(base + 3),
            });

            if self.line_sprites.len() == MAX_SPRITES_PER_LINE {
                break;
            }
        }

        self.line_sprites.sort_by(|a, b| b.x.cmp(&a.x));
    }

    /// Draw the window if it covers this line, else the background
    fn draw_bg_and_window<M: VideoMemory + ?Sized>(&mut self, lcd: &Lcd, line: u8, mem: &M) {
        let in_window = lcd.window_enabled()
            && line >= lcd.wy
            && ((line - lcd.wy) as usize) < SCREEN_HEIGHT;

        let (tile_map, mut col, row) = if in_window {
            (lcd.window_tile_map(), 0u8, line - lcd.wy)
        } else {
            if !lcd.bg_enabled() {
                self.bg_line.fill(0);
                self.frame.fill_line(line as usize, lcd.bg_palette.map(0));
                return;
            }
            (lcd.bg_tile_map(), lcd.scx, lcd.scy.wrapping_add(line))
        };

        for x in 0..SCREEN_WIDTH {
            let color = Self::tile_pixel(lcd, tile_map, col, row, mem);
            self.bg_line[x] = color;
            self.frame.put_scaled(x, line as usize, lcd.bg_palette.map(color));
            col = col.wrapping_add(1);
        }
    }

    /// Raw color of the tile map pixel at (`col`, `row`)
    fn tile_pixel<M: VideoMemory + ?Sized>(lcd: &Lcd, tile_map: Word, col: u8, row: u8, mem: &M) -> Byte {
        let map_offset = (row / 8) as Word * 32 + (col / 8) as Word;
        let tile_index = mem.read(tile_map + map_offset);

        let addr = lcd.bg_tile_address(tile_index) + (row % 8) as Word * 2;
        let lo = mem.read(addr);
        let hi = mem.read(addr + 1);

        plane_color(lo, hi, 7 - col % 8)
    }

    fn draw_sprites<M: VideoMemory + ?Sized>(&mut self, lcd: &Lcd, line: u8, mem: &M) {
        let height = lcd.sprite_height();

        for sprite in &self.line_sprites {
            if sprite.x < -7 || sprite.x >= SCREEN_WIDTH as i16 {
                continue;
            }

            let mut row = (line as i16 - sprite.y) as u8;
            if sprite.y_flip() {
                row = height - 1 - row;
            }

            let addr = VRAM_START + sprite.tile as Word * 16 + row as Word * 2;
            let lo = mem.read(addr);
            let hi = mem.read(addr + 1);

            for col in 0..8u8 {
                let x = sprite.x + col as i16;
                if x < 0 || x >= SCREEN_WIDTH as i16 {
                    continue;
                }
                let x = x as usize;

                let bit = if sprite.x_flip() { col } else { 7 - col };
                let color = plane_color(lo, hi, bit);

                // Color 0 is transparent for sprites
                if color == 0 {
                    continue;
                }

                // Behind-background sprites only show through BG color 0
                if sprite.bg_priority() && self.bg_line[x] != 0 {
                    continue;
                }

                let palette = &lcd.sprite_palettes[sprite.palette_number() as usize];
                self.frame.put_scaled(x, line as usize, palette.map(color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::VideoBus;

    const SOLID_1: [u8; 16] = [0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00];
    const SOLID_2: [u8; 16] = [0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF];
    const SOLID_3: [u8; 16] = [0xFF; 16];

    /// LCD with identity palettes so color indices read back unchanged
    fn identity_lcd(control: u8) -> Lcd {
        let mut lcd = Lcd::new();
        lcd.write_control(control);
        lcd.write_bg_palette(0b11_10_01_00);
        lcd.write_sprite_palette1(0b11_10_01_00);
        lcd.write_sprite_palette2(0b00_01_10_00);
        lcd
    }

    fn native_row(c: &Compositor, line: usize) -> Vec<u8> {
        (0..SCREEN_WIDTH).map(|x| c.frame().native(x, line).unwrap()).collect()
    }

    #[test]
    fn test_bg_disabled_fills_with_palette_entry_zero() {
        let mut lcd = identity_lcd(0x00);
        lcd.write_bg_palette(0b00_00_00_10);
        let bus = VideoBus::new();
        let mut c = Compositor::new();

        for line in [0u8, 1, 77, 143] {
            c.render_line(&lcd, line, &bus);
            for y in crate::frame::scale_span(line as usize) {
                assert!(c.frame().row(y).unwrap().iter().all(|&p| p == 2));
            }
        }
    }

    #[test]
    fn test_bg_unsigned_tile_data() {
        let lcd = identity_lcd(0x11);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_3);
        bus.write(0x9801, 1); // second map column

        let mut c = Compositor::new();
        c.render_line(&lcd, 0, &bus);
        let row = native_row(&c, 0);

        assert!(row[0..8].iter().all(|&p| p == 0));
        assert!(row[8..16].iter().all(|&p| p == 3));
        assert!(row[16..].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_bg_signed_tile_data() {
        let lcd = identity_lcd(0x01);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8FF0, &SOLID_2); // tile -1
        bus.write_tile(0x9000, &SOLID_1); // tile 0
        bus.write(0x9800, 0xFF);

        let mut c = Compositor::new();
        c.render_line(&lcd, 3, &bus);
        let row = native_row(&c, 3);

        assert!(row[0..8].iter().all(|&p| p == 2));
        assert!(row[8..16].iter().all(|&p| p == 1));
    }

    #[test]
    fn test_bg_pixel_bit_order() {
        let lcd = identity_lcd(0x11);
        let mut bus = VideoBus::new();
        // Row 2 of tile 0: leftmost pixel color 1, next color 2, rightmost color 3
        bus.write(0x8004, 0b1000_0001);
        bus.write(0x8005, 0b0100_0001);

        let mut c = Compositor::new();
        c.render_line(&lcd, 2, &bus);
        let row = native_row(&c, 2);
        assert_eq!(&row[0..8], &[1, 2, 0, 0, 0, 0, 0, 3]);
    }

    #[test]
    fn test_bg_scroll() {
        let mut lcd = identity_lcd(0x11);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_3);
        bus.write(0x9800 + 32 + 1, 1); // map row 1, column 1

        lcd.write_scroll_x(8);
        lcd.write_scroll_y(8);

        let mut c = Compositor::new();
        c.render_line(&lcd, 0, &bus);
        let row = native_row(&c, 0);
        assert!(row[0..8].iter().all(|&p| p == 3));
        assert!(row[8..].iter().all(|&p| p == 0));

        // Horizontal scroll wraps around the 256-pixel map
        lcd.write_scroll_x(240);
        c.render_line(&lcd, 0, &bus);
        let row = native_row(&c, 0);
        assert!(row[24..32].iter().all(|&p| p == 3));
    }

    #[test]
    fn test_window_layer() {
        let mut lcd = identity_lcd(0x11 | 0x20 | 0x40);
        lcd.write_window_y(10);
        lcd.write_window_x(100); // column offset is not applied
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_2);
        bus.write(0x9C00, 1);
        bus.write_tile(0x8020, &SOLID_1);
        bus.write(0x9820, 2); // map row 1 covers line 9

        let mut c = Compositor::new();

        c.render_line(&lcd, 9, &bus);
        assert_eq!(c.frame().native(0, 9), Some(1)); // background

        c.render_line(&lcd, 10, &bus);
        let row = native_row(&c, 10);
        assert!(row[0..8].iter().all(|&p| p == 2)); // window row 0
        assert!(row[8..].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_window_drawn_even_with_bg_disabled() {
        let lcd = identity_lcd(0x10 | 0x20);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8000, &SOLID_3);

        let mut c = Compositor::new();
        c.render_line(&lcd, 0, &bus);
        assert!(native_row(&c, 0).iter().all(|&p| p == 3));
    }

    #[test]
    fn test_sprite_lower_x_wins() {
        let lcd = identity_lcd(0x02);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_1);
        bus.write_tile(0x8020, &SOLID_2);
        // Higher X sprite first in OAM so table order alone would not decide
        bus.write_sprite(0, 16, 14 + 8, 2, 0);
        bus.write_sprite(1, 16, 10 + 8, 1, 0);

        let mut c = Compositor::new();
        c.render_line(&lcd, 0, &bus);
        let row = native_row(&c, 0);

        assert!(row[10..18].iter().all(|&p| p == 1));
        assert!(row[18..22].iter().all(|&p| p == 2));
        assert_eq!(row[9], 0);
        assert_eq!(row[22], 0);
    }

    #[test]
    fn test_sprite_equal_x_keeps_table_order() {
        let lcd = identity_lcd(0x02);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_1);
        bus.write_tile(0x8020, &SOLID_2);
        bus.write_sprite(0, 16, 40, 2, 0);
        bus.write_sprite(1, 16, 40, 1, 0);

        let mut c = Compositor::new();
        c.render_line(&lcd, 0, &bus);
        // Ties keep OAM order, so the later entry is drawn over the earlier one
        assert!(native_row(&c, 0)[32..40].iter().all(|&p| p == 1));
        let order: Vec<u8> = c.line_sprites().iter().map(|s| s.index).collect();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn test_oam_cap_ten_sprites() {
        let lcd = identity_lcd(0x02);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_1);
        for i in 0..12 {
            bus.write_sprite(i, 16, (i * 12 + 8) as u8, 1, 0);
        }

        let mut c = Compositor::new();
        c.render_line(&lcd, 0, &bus);
        let row = native_row(&c, 0);

        assert_eq!(c.line_sprites().len(), 10);
        for i in 0..10 {
            assert!(row[i * 12..i * 12 + 8].iter().all(|&p| p == 1), "sprite {}", i);
        }
        for i in 10..12 {
            assert!(row[i * 12..i * 12 + 8].iter().all(|&p| p == 0), "sprite {}", i);
        }
    }

    #[test]
    fn test_sprite_vertical_range() {
        let mut lcd = identity_lcd(0x02);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_1);
        bus.write_tile(0x8020, &SOLID_1);
        bus.write_sprite(0, 16 + 20, 8, 1, 0);

        let mut c = Compositor::new();
        c.render_line(&lcd, 19, &bus);
        assert!(c.line_sprites().is_empty());
        c.render_line(&lcd, 27, &bus);
        assert_eq!(c.line_sprites().len(), 1);
        c.render_line(&lcd, 28, &bus);
        assert!(c.line_sprites().is_empty());

        lcd.write_control(0x06);
        c.render_line(&lcd, 35, &bus);
        assert_eq!(c.line_sprites().len(), 1);
        assert_eq!(c.frame().native(0, 35), Some(1));
        c.render_line(&lcd, 36, &bus);
        assert!(c.line_sprites().is_empty());
    }

    #[test]
    fn test_sprite_flips() {
        let lcd = identity_lcd(0x02);
        let mut bus = VideoBus::new();
        // Tile 1: only row 0, only the leftmost pixel, color 3
        bus.write(0x8010, 0x80);
        bus.write(0x8011, 0x80);

        bus.write_sprite(0, 16, 8, 1, 0x60); // X and Y flip
        let mut c = Compositor::new();

        c.render_line(&lcd, 0, &bus);
        assert!(native_row(&c, 0)[0..8].iter().all(|&p| p == 0));

        c.render_line(&lcd, 7, &bus);
        let row = native_row(&c, 7);
        assert_eq!(&row[0..8], &[0, 0, 0, 0, 0, 0, 0, 3]);
    }

    #[test]
    fn test_sprite_y_flip_tall() {
        let lcd = identity_lcd(0x06);
        let mut bus = VideoBus::new();
        // Tiles 2 and 3 form one 8x16 sprite: row 0 color 3, row 15 color 1
        bus.write(0x8020, 0x80);
        bus.write(0x8021, 0x80);
        bus.write(0x803E, 0x80);

        bus.write_sprite(0, 16, 8, 2, 0x40);
        let mut c = Compositor::new();

        c.render_line(&lcd, 0, &bus);
        assert_eq!(c.frame().native(0, 0), Some(1));

        c.render_line(&lcd, 1, &bus);
        assert_eq!(c.frame().native(0, 1), Some(0));

        c.render_line(&lcd, 15, &bus);
        assert_eq!(c.frame().native(0, 15), Some(3));
    }

    #[test]
    fn test_sprite_palette_select() {
        let lcd = identity_lcd(0x02);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_1);
        bus.write_sprite(0, 16, 8, 1, 0x10);

        let mut c = Compositor::new();
        c.render_line(&lcd, 0, &bus);
        // OBP1 maps color 1 to 2
        assert_eq!(c.frame().native(0, 0), Some(2));
    }

    #[test]
    fn test_sprite_bg_priority() {
        let lcd = identity_lcd(0x13);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_1); // background tile, color 1
        bus.write_tile(0x8020, &SOLID_3); // sprite tile
        bus.write(0x9800, 1); // map column 0 uses tile 1, column 1 tile 0 (color 0)

        bus.write_sprite(0, 16, 8 + 4, 2, 0x80);

        let mut c = Compositor::new();
        c.render_line(&lcd, 0, &bus);
        let row = native_row(&c, 0);
        assert!(row[4..8].iter().all(|&p| p == 1)); // hidden behind BG color 1
        assert!(row[8..12].iter().all(|&p| p == 3)); // shows through BG color 0
    }

    #[test]
    fn test_sprites_disabled() {
        let lcd = identity_lcd(0x00);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_1);
        bus.write_sprite(0, 16, 8, 1, 0);

        let mut c = Compositor::new();
        c.render_line(&lcd, 0, &bus);
        assert_eq!(c.frame().native(0, 0), Some(0));
    }

    #[test]
    fn test_sprite_clipped_at_left_edge() {
        let lcd = identity_lcd(0x02);
        let mut bus = VideoBus::new();
        bus.write_tile(0x8010, &SOLID_1);
        bus.write_sprite(0, 16, 4, 1, 0); // x = -4

        let mut c = Compositor::new();
        c.render_line(&lcd, 0, &bus);
        let row = native_row(&c, 0);
        assert!(row[0..4].iter().all(|&p| p == 1));
        assert_eq!(row[4], 0);
    }
}
