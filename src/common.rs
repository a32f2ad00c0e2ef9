//! Common types and utilities for the LCD core
//!
//! This module defines type aliases matching Game Boy hardware specifications
//! and provides bit manipulation utilities.

/// 8-bit unsigned integer (Game Boy byte)
pub type Byte = u8;

/// 16-bit unsigned integer (Game Boy word)
pub type Word = u16;

/// Check if a specific bit is set in a byte value
///
/// # Arguments
/// * `value` - The byte value to check
/// * `n` - The bit position (0-7)
///
/// # Returns
/// `true` if the bit at position `n` is set, `false` otherwise
#[inline]
pub fn bit(value: Byte, n: u8) -> bool {
    (value & (1 << n)) != 0
}

/// Set or clear a specific bit in a byte value
///
/// # Arguments
/// * `value` - Mutable reference to the byte value
/// * `n` - The bit position (0-7)
/// * `on` - `true` to set the bit, `false` to clear it
#[inline]
pub fn bit_set(value: &mut Byte, n: u8, on: bool) {
    if on {
        *value |= 1 << n;
    } else {
        *value &= !(1 << n);
    }
}

/// Extract the 2-bit field at position `index` (0-3) of a packed byte
#[inline]
pub fn crumb(value: Byte, index: u8) -> Byte {
    (value >> (index * 2)) & 0x03
}

/// Combine bit `n` of two tile bit-planes into a 2-bit color value
///
/// `lo` supplies bit 0 and `hi` bit 1 of the result.
#[inline]
pub fn plane_color(lo: Byte, hi: Byte, n: u8) -> Byte {
    ((hi >> n) & 1) << 1 | ((lo >> n) & 1)
}
