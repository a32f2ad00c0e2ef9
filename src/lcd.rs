//! LCD Control
//!
//! This module implements the LCD register bank. Raw byte writes are decoded
//! into flags and palette tables up front so the compositor never has to
//! re-parse them per pixel.
//!
//! LCD Registers:
//! - LCDC (0xFF40): LCD Control
//! - STAT (0xFF41): LCD Status
//! - SCY (0xFF42): Scroll Y
//! - SCX (0xFF43): Scroll X
//! - LY (0xFF44): Current scanline (read-only)
//! - LYC (0xFF45): LY Compare
//! - DMA (0xFF46): DMA Transfer (not part of the LCD)
//! - BGP (0xFF47): Background Palette
//! - OBP0 (0xFF48): Object Palette 0
//! - OBP1 (0xFF49): Object Palette 1
//! - WY (0xFF4A): Window Y Position
//! - WX (0xFF4B): Window X Position

use log::debug;

use crate::common::{bit, bit_set, crumb, Byte, Word};

/// PPU modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpuMode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Transfer = 3,
}

/// Decoded LCDC flags, bit 0 first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LcdControl {
    /// BG enable (bit 0)
    pub bg_enabled: bool,
    /// Sprite enable (bit 1)
    pub sprites_enabled: bool,
    /// Sprite size (bit 2), false = 8x8, true = 8x16
    pub tall_sprites: bool,
    /// BG tile map select (bit 3), false = 0x9800, true = 0x9C00
    pub bg_tile_map: bool,
    /// BG & window tile data select (bit 4), false = 0x9000 signed, true = 0x8000 unsigned
    pub unsigned_tile_data: bool,
    /// Window enable (bit 5)
    pub window_enabled: bool,
    /// Window tile map select (bit 6), false = 0x9800, true = 0x9C00
    pub window_tile_map: bool,
    /// LCD display enable (bit 7)
    pub lcd_enabled: bool,
}

impl LcdControl {
    pub fn from_byte(value: Byte) -> Self {
        Self {
            bg_enabled: bit(value, 0),
            sprites_enabled: bit(value, 1),
            tall_sprites: bit(value, 2),
            bg_tile_map: bit(value, 3),
            unsigned_tile_data: bit(value, 4),
            window_enabled: bit(value, 5),
            window_tile_map: bit(value, 6),
            lcd_enabled: bit(value, 7),
        }
    }

    pub fn to_byte(self) -> Byte {
        let mut value = 0;
        bit_set(&mut value, 0, self.bg_enabled);
        bit_set(&mut value, 1, self.sprites_enabled);
        bit_set(&mut value, 2, self.tall_sprites);
        bit_set(&mut value, 3, self.bg_tile_map);
        bit_set(&mut value, 4, self.unsigned_tile_data);
        bit_set(&mut value, 5, self.window_enabled);
        bit_set(&mut value, 6, self.window_tile_map);
        bit_set(&mut value, 7, self.lcd_enabled);
        value
    }
}

/// Four-entry palette mapping a 2-bit pixel value to a display color index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    entries: [Byte; 4],
}

impl Palette {
    pub const fn new(entries: [Byte; 4]) -> Self {
        Self { entries }
    }

    /// Decode a background palette register
    pub fn background(value: Byte) -> Self {
        Self {
            entries: [crumb(value, 0), crumb(value, 1), crumb(value, 2), crumb(value, 3)],
        }
    }

    /// Decode a sprite palette register
    ///
    /// Sprite color 0 is never drawn, so entry 0 is pinned to 0 whatever
    /// the written bits say.
    pub fn sprite(value: Byte) -> Self {
        Self {
            entries: [0, crumb(value, 1), crumb(value, 2), crumb(value, 3)],
        }
    }

    /// Map a 2-bit pixel value through the palette
    #[inline]
    pub fn map(&self, color: Byte) -> Byte {
        self.entries[(color & 0x03) as usize]
    }

    /// Re-encode as a register value
    pub fn to_byte(&self) -> Byte {
        self.entries
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &c)| acc | (c & 0x03) << (i * 2))
    }
}

/// LCD register bank
#[derive(Debug, Clone)]
pub struct Lcd {
    /// LCDC - LCD Control (0xFF40), decoded
    pub control: LcdControl,
    /// STAT bit 6 - LYC=LY coincidence interrupt enable
    pub lyc_int_enabled: bool,
    /// STAT bit 3 - HBlank interrupt enable (stored, never raised)
    pub hblank_int_enabled: bool,
    /// STAT bit 4 - VBlank interrupt enable (stored, never raised)
    pub vblank_int_enabled: bool,
    /// STAT bit 5 - OAM interrupt enable (stored, never raised)
    pub oam_int_enabled: bool,
    /// Current PPU mode
    pub mode: PpuMode,
    /// SCY - Scroll Y (0xFF42)
    pub scy: Byte,
    /// SCX - Scroll X (0xFF43)
    pub scx: Byte,
    /// LY - Current scanline (0xFF44), 0..=153
    pub ly: Byte,
    /// LYC - LY Compare (0xFF45)
    pub lyc: Byte,
    /// BGP - Background Palette (0xFF47)
    pub bg_palette: Palette,
    /// OBP0/OBP1 - Object Palettes (0xFF48, 0xFF49)
    pub sprite_palettes: [Palette; 2],
    /// WY - Window Y Position (0xFF4A)
    pub wy: Byte,
    /// WX - Window X Position (0xFF4B)
    pub wx: Byte,
}

impl Default for Lcd {
    fn default() -> Self {
        Self::new()
    }
}

impl Lcd {
    /// Create a new LCD in its power-on state
    pub fn new() -> Self {
        Self {
            control: LcdControl::default(),
            lyc_int_enabled: false,
            hblank_int_enabled: false,
            vblank_int_enabled: false,
            oam_int_enabled: false,
            mode: PpuMode::OamScan,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bg_palette: Palette::new([3, 2, 1, 0]),
            sprite_palettes: [Palette::new([0, 1, 2, 3]); 2],
            wy: 0,
            wx: 0,
        }
    }

    /// Initialize LCD to boot ROM skip state
    pub fn init(&mut self) {
        *self = Self::new();
        self.write_control(0x91); // LCD enabled, BG enabled, unsigned tile data
        self.write_bg_palette(0xFC);
        self.write_sprite_palette1(0xFF);
        self.write_sprite_palette2(0xFF);
    }

    /// Read LCD register
    pub fn read(&self, address: Word) -> Byte {
        match address {
            0xFF40 => self.control(),
            0xFF41 => self.read_status(),
            0xFF42 => self.scy,
            0xFF43 => self.scx,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47 => self.bg_palette.to_byte(),
            0xFF48 => self.sprite_palettes[0].to_byte(),
            0xFF49 => self.sprite_palettes[1].to_byte(),
            0xFF4A => self.wy,
            0xFF4B => self.wx,
            _ => 0xFF,
        }
    }

    /// Write LCD register
    pub fn write(&mut self, address: Word, value: Byte) {
        match address {
            0xFF40 => self.write_control(value),
            0xFF41 => self.write_status(value),
            0xFF42 => self.write_scroll_y(value),
            0xFF43 => self.write_scroll_x(value),
            0xFF44 => {} // LY is read-only
            0xFF45 => self.set_ly_compare(value),
            0xFF47 => self.write_bg_palette(value),
            0xFF48 => self.write_sprite_palette1(value),
            0xFF49 => self.write_sprite_palette2(value),
            0xFF4A => self.write_window_y(value),
            0xFF4B => self.write_window_x(value),
            _ => {}
        }
    }

    // ========== Register Writes ==========

    pub fn write_control(&mut self, value: Byte) {
        let control = LcdControl::from_byte(value);
        if control != self.control {
            debug!("LCDC write: 0x{:02X} {:?}", value, control);
        }
        self.control = control;
    }

    /// Only the coincidence enable has an effect; the mode interrupt
    /// enables are kept for read-back by debuggers.
    pub fn write_status(&mut self, value: Byte) {
        self.hblank_int_enabled = bit(value, 3);
        self.vblank_int_enabled = bit(value, 4);
        self.oam_int_enabled = bit(value, 5);
        self.lyc_int_enabled = bit(value, 6);
        debug!("STAT write: 0x{:02X} (lyc interrupt: {})", value, self.lyc_int_enabled);
    }

    pub fn write_scroll_x(&mut self, value: Byte) {
        self.scx = value;
    }

    pub fn write_scroll_y(&mut self, value: Byte) {
        self.scy = value;
    }

    pub fn write_window_x(&mut self, value: Byte) {
        self.wx = value;
    }

    pub fn write_window_y(&mut self, value: Byte) {
        self.wy = value;
    }

    pub fn set_ly_compare(&mut self, value: Byte) {
        self.lyc = value;
    }

    pub fn write_bg_palette(&mut self, value: Byte) {
        self.bg_palette = Palette::background(value);
    }

    pub fn write_sprite_palette1(&mut self, value: Byte) {
        self.sprite_palettes[0] = Palette::sprite(value);
    }

    pub fn write_sprite_palette2(&mut self, value: Byte) {
        self.sprite_palettes[1] = Palette::sprite(value);
    }

    // ========== Register Reads ==========

    /// LCDC re-encoded from the decoded flags
    pub fn control(&self) -> Byte {
        self.control.to_byte()
    }

    /// STAT as the hardware exposes it here: coincidence enable and mode
    pub fn read_status(&self) -> Byte {
        (self.lyc_int_enabled as Byte) << 6 | self.mode as Byte
    }

    /// Current scanline
    pub fn line(&self) -> u8 {
        self.ly
    }

    // ========== LCDC Accessors ==========

    pub fn lcd_enabled(&self) -> bool {
        self.control.lcd_enabled
    }

    pub fn window_enabled(&self) -> bool {
        self.control.window_enabled
    }

    pub fn bg_enabled(&self) -> bool {
        self.control.bg_enabled
    }

    pub fn sprites_enabled(&self) -> bool {
        self.control.sprites_enabled
    }

    /// Window tile map base address
    pub fn window_tile_map(&self) -> Word {
        if self.control.window_tile_map { 0x9C00 } else { 0x9800 }
    }

    /// BG tile map base address
    pub fn bg_tile_map(&self) -> Word {
        if self.control.bg_tile_map { 0x9C00 } else { 0x9800 }
    }

    /// Address of the first byte of a BG/window tile
    ///
    /// Unsigned mode indexes from 0x8000; signed mode treats the index as
    /// an i8 around 0x9000.
    pub fn bg_tile_address(&self, tile_index: Byte) -> Word {
        if self.control.unsigned_tile_data {
            0x8000 + tile_index as Word * 16
        } else {
            (0x9000i32 + (tile_index as i8 as i32) * 16) as Word
        }
    }

    /// Sprite height in pixels
    pub fn sprite_height(&self) -> u8 {
        if self.control.tall_sprites { 16 } else { 8 }
    }

    // ========== LY Handling ==========

    /// Move to the next scanline, wrapping after line 153
    pub fn inc_ly(&mut self) {
        self.ly = if self.ly >= 153 { 0 } else { self.ly + 1 };
    }

    /// True when the coincidence interrupt should fire for the current line
    pub fn lyc_match(&self) -> bool {
        self.lyc_int_enabled && self.ly == self.lyc
    }
}
