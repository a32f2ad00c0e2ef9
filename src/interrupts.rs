//! Interrupts
//!
//! The PPU does not deliver interrupts itself. It raises them through an
//! [`InterruptSink`] supplied by the driving loop, which owns queuing and
//! dispatch to the CPU.

use crate::common::{bit, Byte};

/// Interrupt sources raised by the LCD, numbered by their IF bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterruptType {
    VBlank = 0,
    LcdStat = 1,
}

impl InterruptType {
    /// Bit mask of this interrupt in the IF register
    pub fn mask(self) -> Byte {
        1 << (self as u8)
    }
}

/// Receiver of raised interrupts
pub trait InterruptSink {
    /// Raise an interrupt of the given kind
    fn raise(&mut self, kind: InterruptType);
}

/// Records raised interrupts in order, mostly useful for tests and tracing
impl InterruptSink for Vec<InterruptType> {
    fn raise(&mut self, kind: InterruptType) {
        self.push(kind);
    }
}

/// Request bits of the IF register
///
/// Raising an interrupt sets its request bit; the driving loop clears it
/// with [`InterruptFlags::acknowledge`] once serviced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptFlags {
    bits: Byte,
}

impl InterruptFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an interrupt is requested
    pub fn is_requested(&self, kind: InterruptType) -> bool {
        bit(self.bits, kind as u8)
    }

    /// Clear the request bit of a serviced interrupt
    pub fn acknowledge(&mut self, kind: InterruptType) {
        self.bits &= !kind.mask();
    }
}

impl InterruptSink for InterruptFlags {
    fn raise(&mut self, kind: InterruptType) {
        self.bits |= kind.mask();
    }
}
