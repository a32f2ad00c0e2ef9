//! PPU Module
//!
//! This module implements the Pixel Processing Unit (PPU) for the Game Boy.
//! The PPU is driven with the caller's running cycle count; whenever a line
//! period elapses it renders the retiring line, advances LY and raises the
//! LCD STAT and VBlank interrupts.

pub mod modes;
pub mod pipeline;

use log::trace;

use crate::bus::VideoMemory;
use crate::common::{bit, Byte};
use crate::frame::{FrameBuffer, SCREEN_HEIGHT};
use crate::interrupts::{InterruptSink, InterruptType};
use crate::lcd::{Lcd, PpuMode};
use modes::{Timing, CYCLES_PER_LINE};
use pipeline::Compositor;

/// Scanline counts
pub const LINES_PER_FRAME: u8 = 154;
pub const OAM_ENTRIES: usize = 40;
pub const MAX_SPRITES_PER_LINE: usize = 10;

/// Sprite selected for a scanline, with hardware offsets already removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sprite {
    /// OAM index (0-39)
    pub index: u8,
    /// Y position (stored Y minus 16)
    pub y: i16,
    /// X position (stored X minus 8)
    pub x: i16,
    /// Tile index
    pub tile: Byte,
    /// Flags (priority, flip, palette)
    pub flags: Byte,
}

impl Sprite {
    /// Palette number (bit 4), selects OBP0 or OBP1
    pub fn palette_number(&self) -> bool {
        bit(self.flags, 4)
    }

    /// X flip (bit 5)
    pub fn x_flip(&self) -> bool {
        bit(self.flags, 5)
    }

    /// Y flip (bit 6)
    pub fn y_flip(&self) -> bool {
        bit(self.flags, 6)
    }

    /// BG/Window over OBJ priority (bit 7)
    pub fn bg_priority(&self) -> bool {
        bit(self.flags, 7)
    }
}

/// Pixel Processing Unit
#[derive(Debug, Clone, Default)]
pub struct Ppu {
    /// Cycle accumulators
    timing: Timing,
    /// Scanline renderer and output frame
    compositor: Compositor,
    /// Frames completed since reset
    pub current_frame: u64,
}

impl Ppu {
    /// Create a new PPU
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the frame and clear the output. The caller's cycle counter
    /// keeps running, so the last seen count is kept as the reference.
    pub fn init(&mut self) {
        self.timing.restart();
        self.compositor.clear();
        self.current_frame = 0;
    }

    /// Drive the PPU up to the caller's cycle count (in M-cycles).
    ///
    /// Every line period elapsed since the previous call is retired in
    /// order. Returns `true` if a frame was completed (LY reached 144)
    /// during this call; several completions in one call report once.
    pub fn tick<M, I>(&mut self, lcd: &mut Lcd, cycles: u64, mem: &M, irq: &mut I) -> bool
    where
        M: VideoMemory + ?Sized,
        I: InterruptSink + ?Sized,
    {
        self.timing.advance(cycles);

        let mut frame_complete = false;
        while self.timing.take_line() {
            if self.retire_line(lcd, mem, irq) as usize == SCREEN_HEIGHT {
                frame_complete = true;
            }
        }

        self.update_mode(lcd);
        frame_complete
    }

    /// Render the current line, then move LY on. Returns the new LY.
    fn retire_line<M, I>(&mut self, lcd: &mut Lcd, mem: &M, irq: &mut I) -> u8
    where
        M: VideoMemory + ?Sized,
        I: InterruptSink + ?Sized,
    {
        if (lcd.ly as usize) < SCREEN_HEIGHT {
            self.compositor.render_line(lcd, lcd.ly, mem);
        }

        lcd.inc_ly();
        if self.timing.end_of_frame() {
            self.timing.wrap_frame();
            lcd.ly = 0;
        }

        if lcd.lyc_match() {
            trace!("LYC coincidence on line {}", lcd.ly);
            irq.raise(InterruptType::LcdStat);
        }

        if lcd.ly as usize == SCREEN_HEIGHT {
            lcd.mode = PpuMode::VBlank;
            self.current_frame += 1;
            trace!("Frame {} complete", self.current_frame);
            irq.raise(InterruptType::VBlank);
        }

        lcd.ly
    }

    /// Derive the mode from the position within the current line
    fn update_mode(&mut self, lcd: &mut Lcd) {
        if lcd.ly as usize >= SCREEN_HEIGHT {
            lcd.mode = PpuMode::VBlank;
            return;
        }

        lcd.mode = modes::visible_mode(self.timing.line_cycles());

        // HBlank of the first line period always belongs to line 0
        if lcd.mode == PpuMode::HBlank && self.timing.frame_cycles() < CYCLES_PER_LINE {
            lcd.ly = 0;
        }
    }

    /// Render a single line immediately, outside of the timing loop
    pub fn render_line<M: VideoMemory + ?Sized>(&mut self, lcd: &Lcd, line: u8, mem: &M) {
        self.compositor.render_line(lcd, line, mem);
    }

    /// Output frame; complete only right after `tick` reported a frame
    pub fn frame(&self) -> &FrameBuffer {
        self.compositor.frame()
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }
}
