//! Game Boy LCD Library
//!
//! This library emulates the Game Boy picture-generation unit: LCD register
//! decoding, scanline timing with LYC/VBlank interrupts, and a scanline
//! compositor that writes a 3:2 upscaled 240x216 frame of display color
//! indices.

pub mod common;
pub mod bus;
pub mod interrupts;
pub mod lcd;
pub mod frame;
pub mod ppu;
pub mod display;
pub mod error;
pub mod config;
pub mod emu;
pub mod logger;
#[cfg(feature = "display")]
pub mod ui;

pub use error::{Error, Result};
