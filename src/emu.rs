//! Emulator Harness
//!
//! Drives the PPU against a 64KB address-space image without a CPU: the
//! image supplies VRAM, OAM and the LCD register values, and the harness
//! plays the role of the cycle-stepping loop and the interrupt controller.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::bus::VideoMemory;
use crate::common::Word;
use crate::display::DisplayPalette;
use crate::error::{Error, Result};
use crate::frame::{FrameBuffer, FrameSlot, TARGET_HEIGHT, TARGET_WIDTH};
use crate::interrupts::{InterruptFlags, InterruptType};
use crate::lcd::Lcd;
use crate::ppu::modes::CYCLES_PER_FRAME;
use crate::ppu::Ppu;

/// Size of a full address-space image
pub const IMAGE_SIZE: usize = 0x10000;

/// Emulator context state
#[derive(Debug, Clone, Default)]
pub struct EmulatorContext {
    /// Total M-cycles driven into the PPU
    pub ticks: u64,
    /// VBlank interrupts observed
    pub vblanks: u64,
    /// LCD STAT interrupts observed
    pub lcd_stats: u64,
}

/// PPU, register bank and memory image wired together
pub struct Emulator {
    /// Emulator context/state
    pub ctx: EmulatorContext,
    /// PPU
    pub ppu: Ppu,
    /// LCD controller
    pub lcd: Lcd,
    /// Address-space image
    memory: Vec<u8>,
    /// Interrupt requests (IF)
    pub int_flags: InterruptFlags,
    /// Last completed frame as ARGB8888
    video_buffer: Vec<u32>,
    /// Colors for `video_buffer`
    palette: DisplayPalette,
    /// Optional hand-off to a presenter on another thread
    slot: Option<FrameSlot>,
}

impl Emulator {
    /// Load an address-space image from disk
    pub fn from_dump<P: AsRef<Path>>(path: P, palette: DisplayPalette) -> Result<Self> {
        let image = fs::read(path.as_ref())?;
        info!("Loaded dump: {} ({} bytes)", path.as_ref().display(), image.len());
        Self::from_image(image, palette)
    }

    /// Build an emulator around an in-memory image
    pub fn from_image(memory: Vec<u8>, palette: DisplayPalette) -> Result<Self> {
        if memory.len() != IMAGE_SIZE {
            return Err(Error::DumpSize {
                expected: IMAGE_SIZE,
                actual: memory.len(),
            });
        }

        let mut lcd = Lcd::new();
        for address in 0xFF40..=0xFF4B as Word {
            lcd.write(address, memory.read(address));
        }
        debug!(
            "LCD programmed from image: LCDC=0x{:02X} STAT=0x{:02X} BGP=0x{:02X}",
            lcd.control(),
            lcd.read_status(),
            lcd.read(0xFF47)
        );

        Ok(Self {
            ctx: EmulatorContext::default(),
            ppu: Ppu::new(),
            lcd,
            memory,
            int_flags: InterruptFlags::new(),
            video_buffer: vec![0; TARGET_WIDTH * TARGET_HEIGHT],
            palette,
            slot: None,
        })
    }

    /// Publish every completed frame to a presenter
    pub fn attach_slot(&mut self, slot: FrameSlot) {
        self.slot = Some(slot);
    }

    /// Advance by `cycles` M-cycles. Returns `true` if a frame completed.
    pub fn step(&mut self, cycles: u64) -> bool {
        self.ctx.ticks += cycles;
        let complete = self
            .ppu
            .tick(&mut self.lcd, self.ctx.ticks, &self.memory, &mut self.int_flags);

        self.service_interrupts();

        if complete {
            self.palette.frame_to_argb(self.ppu.frame(), &mut self.video_buffer);
            if let Some(slot) = &self.slot {
                slot.publish(self.ppu.frame());
            }
        }
        complete
    }

    /// Acknowledge raised interrupts; there is no CPU to service them
    fn service_interrupts(&mut self) {
        if self.int_flags.is_requested(InterruptType::VBlank) {
            self.ctx.vblanks += 1;
            self.int_flags.acknowledge(InterruptType::VBlank);
        }
        if self.int_flags.is_requested(InterruptType::LcdStat) {
            self.ctx.lcd_stats += 1;
            self.int_flags.acknowledge(InterruptType::LcdStat);
        }
    }

    /// Run one M-cycle at a time until the next frame completes
    pub fn run_frame(&mut self) {
        for _ in 0..CYCLES_PER_FRAME {
            if self.step(1) {
                return;
            }
        }
    }

    /// Last completed frame as display color indices
    pub fn frame(&self) -> &FrameBuffer {
        self.ppu.frame()
    }

    /// Last completed frame as ARGB8888
    pub fn get_video_buffer(&self) -> &[u32] {
        &self.video_buffer
    }

    pub fn current_frame(&self) -> u64 {
        self.ppu.current_frame
    }
}
