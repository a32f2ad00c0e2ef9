//! Viewer Configuration
//!
//! The dump is a 64KB image of the console address space. Its tile data,
//! tile maps and OAM feed the compositor, and its 0xFF40-0xFF4B bytes
//! program the LCD registers.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;

use crate::display::DisplayPalette;

/// Named presentation palettes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaletteName {
    Green,
    #[value(alias = "grey")]
    Gray,
}

impl PaletteName {
    pub fn colors(self) -> DisplayPalette {
        match self {
            PaletteName::Green => DisplayPalette::GREEN,
            PaletteName::Gray => DisplayPalette::GRAY,
        }
    }
}

/// Viewer settings
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about = "A Game Boy LCD viewer.", long_about = None)]
pub struct Config {
    /// Address-space image to render
    #[arg(name = "DUMP")]
    pub dump_path: PathBuf,

    /// Frames to emulate before stopping (0 = until the window is closed)
    #[arg(long, default_value_t = 1)]
    pub frames: u32,

    /// Window scale factor
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=8))]
    pub scale: u32,

    /// Colors used to present the frame
    #[arg(long, value_enum, default_value_t = PaletteName::Green)]
    pub palette: PaletteName,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
