//! Video Memory
//!
//! The compositor never owns tile or sprite data. It reads them through the
//! [`VideoMemory`] capability, so the same PPU runs against a full
//! address-space image, an emulator bus, or synthetic test data.
//!
//! Regions read by the PPU:
//! - 0x8000-0x97FF: Tile data (unsigned base 0x8000, signed base 0x9000)
//! - 0x9800-0x9BFF: Tile map 0
//! - 0x9C00-0x9FFF: Tile map 1
//! - 0xFE00-0xFE9F: OAM (40 entries * 4 bytes)

use crate::common::{Byte, Word};

pub const VRAM_START: Word = 0x8000;
pub const VRAM_SIZE: usize = 0x2000;
pub const OAM_START: Word = 0xFE00;
pub const OAM_SIZE: usize = 0xA0;

/// Read-only byte view of the console address space
pub trait VideoMemory {
    /// Read a byte from the given address
    fn read(&self, address: Word) -> Byte;
}

/// A flat address-space image, indexed directly by address.
///
/// Addresses past the end of the slice read as 0xFF (open bus).
impl VideoMemory for [Byte] {
    fn read(&self, address: Word) -> Byte {
        self.get(address as usize).copied().unwrap_or(0xFF)
    }
}

impl VideoMemory for Vec<Byte> {
    fn read(&self, address: Word) -> Byte {
        self.as_slice().read(address)
    }
}

impl<T: VideoMemory + ?Sized> VideoMemory for &T {
    fn read(&self, address: Word) -> Byte {
        (**self).read(address)
    }
}

/// VRAM and OAM storage
///
/// Owns just the two regions the PPU reads; everything else reads as 0xFF.
#[derive(Debug, Clone)]
pub struct VideoBus {
    /// Video RAM (8KB)
    pub vram: [Byte; VRAM_SIZE],
    /// Object Attribute Memory (40 sprites * 4 bytes)
    pub oam: [Byte; OAM_SIZE],
}

impl Default for VideoBus {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoBus {
    /// Create a new store with all memory zeroed
    pub fn new() -> Self {
        Self {
            vram: [0; VRAM_SIZE],
            oam: [0; OAM_SIZE],
        }
    }

    /// Copy VRAM and OAM out of a full address-space image
    pub fn from_image(image: &[Byte]) -> Self {
        let mut bus = Self::new();
        for (offset, byte) in bus.vram.iter_mut().enumerate() {
            *byte = image.read(VRAM_START + offset as Word);
        }
        for (offset, byte) in bus.oam.iter_mut().enumerate() {
            *byte = image.read(OAM_START + offset as Word);
        }
        bus
    }

    /// Write to VRAM or OAM; writes elsewhere are ignored
    pub fn write(&mut self, address: Word, value: Byte) {
        match address {
            0x8000..=0x9FFF => self.vram[(address - VRAM_START) as usize] = value,
            0xFE00..=0xFE9F => self.oam[(address - OAM_START) as usize] = value,
            _ => {}
        }
    }

    /// Store a 16-byte tile at the given address
    pub fn write_tile(&mut self, address: Word, tile: &[Byte; 16]) {
        for (i, &byte) in tile.iter().enumerate() {
            self.write(address.wrapping_add(i as Word), byte);
        }
    }

    /// Store a raw OAM entry (stored Y, stored X, tile, flags)
    pub fn write_sprite(&mut self, index: usize, y: Byte, x: Byte, tile: Byte, flags: Byte) {
        if index >= OAM_SIZE / 4 {
            return;
        }
        let offset = index * 4;
        self.oam[offset..offset + 4].copy_from_slice(&[y, x, tile, flags]);
    }
}

impl VideoMemory for VideoBus {
    fn read(&self, address: Word) -> Byte {
        match address {
            0x8000..=0x9FFF => self.vram[(address - VRAM_START) as usize],
            0xFE00..=0xFE9F => self.oam[(address - OAM_START) as usize],
            _ => 0xFF,
        }
    }
}
