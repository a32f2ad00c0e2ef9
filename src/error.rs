//! Errors
//!
//! The PPU core itself cannot fail; these cover the viewer around it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("memory dump must be {expected} bytes, got {actual}")]
    DumpSize { expected: usize, actual: usize },
    #[error("display error: {0}")]
    Display(String),
}

pub type Result<T> = std::result::Result<T, Error>;
