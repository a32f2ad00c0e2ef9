//! PPU Modes
//!
//! This module implements PPU mode derivation and cycle accounting.
//!
//! All counts are in M-cycles (a quarter of a T-cycle count):
//! - Frame: 70224 T-cycles = 17556
//! - Line: 456 T-cycles = 114
//!   - OAM Search (mode 2): [0, 51)
//!   - Pixel Transfer (mode 3): [51, 71)
//!   - HBlank (mode 0): [71, 114)
//! - VBlank (mode 1): lines 144-153

use crate::lcd::PpuMode;

pub const CYCLES_PER_FRAME: u64 = 70224 / 4;
pub const CYCLES_PER_LINE: u64 = 456 / 4;
pub const OAM_SCAN_END: u64 = 204 / 4;
pub const TRANSFER_END: u64 = 284 / 4;

/// Mode of a visible line, `line_cycles` cycles after the line started
pub fn visible_mode(line_cycles: u64) -> PpuMode {
    if line_cycles < OAM_SCAN_END {
        PpuMode::OamScan
    } else if line_cycles < TRANSFER_END {
        PpuMode::Transfer
    } else {
        PpuMode::HBlank
    }
}

/// Cycle accumulators
///
/// `frame_cycles` counts from the start of the frame. `line_start` is the
/// value of `frame_cycles` at which the current line began; both are
/// rewound by one frame together so per-line accounting carries across the
/// frame boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timing {
    last_cycles: u64,
    frame_cycles: u64,
    line_start: u64,
}

impl Timing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for the cycles elapsed since the previous call
    pub fn advance(&mut self, cycles: u64) {
        let delta = cycles.wrapping_sub(self.last_cycles);
        self.last_cycles = cycles;
        self.frame_cycles += delta;
    }

    /// Cycles since the start of the frame
    pub fn frame_cycles(&self) -> u64 {
        self.frame_cycles
    }

    /// Cycles since the start of the current line
    pub fn line_cycles(&self) -> u64 {
        self.frame_cycles - self.line_start
    }

    /// Consume one full line period if one has elapsed
    pub fn take_line(&mut self) -> bool {
        if self.line_cycles() < CYCLES_PER_LINE {
            return false;
        }
        self.line_start += CYCLES_PER_LINE;
        true
    }

    /// True once all 154 line periods of the frame have been taken
    pub fn end_of_frame(&self) -> bool {
        self.line_start >= CYCLES_PER_FRAME
    }

    /// Rewind both accumulators by one frame, keeping the remainder
    pub fn wrap_frame(&mut self) {
        self.frame_cycles -= CYCLES_PER_FRAME;
        self.line_start -= CYCLES_PER_FRAME;
    }

    /// Start a new frame at the current cycle count
    pub fn restart(&mut self) {
        self.frame_cycles = 0;
        self.line_start = 0;
    }
}
