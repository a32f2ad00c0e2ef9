//! Output Frame
//!
//! The native 160x144 picture is box-scaled 3:2 into a 240x216 buffer of
//! display color indices. Every two source pixels expand to exactly three
//! target pixels (widths alternate 1, 2, 1, 2, ...), in both axes.
//!
//! Mapping an index to an actual color is the presenter's job, see
//! [`crate::display`].

use std::ops::Range;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use crate::common::Byte;

/// Native LCD dimensions
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

/// Scaled output dimensions
pub const TARGET_WIDTH: usize = 240;
pub const TARGET_HEIGHT: usize = 216;

/// Target span covered by native coordinate `n`
#[inline]
pub fn scale_span(n: usize) -> Range<usize> {
    (n * 3 / 2)..((n + 1) * 3 / 2)
}

/// Buffer of display color indices at the output resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<Byte>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; TARGET_WIDTH * TARGET_HEIGHT],
        }
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[Byte] {
        &self.pixels
    }

    /// One output row, `None` below the buffer
    pub fn row(&self, y: usize) -> Option<&[Byte]> {
        if y >= TARGET_HEIGHT {
            return None;
        }
        Some(&self.pixels[y * TARGET_WIDTH..(y + 1) * TARGET_WIDTH])
    }

    /// Pixel at an output coordinate, `None` outside the buffer
    pub fn get(&self, x: usize, y: usize) -> Option<Byte> {
        if x >= TARGET_WIDTH || y >= TARGET_HEIGHT {
            return None;
        }
        Some(self.pixels[y * TARGET_WIDTH + x])
    }

    /// Color index drawn for a native pixel (top-left of its scaled block)
    pub fn native(&self, x: usize, line: usize) -> Option<Byte> {
        self.get(scale_span(x).start, scale_span(line).start)
    }

    /// Write a native pixel into its scaled block. Out of range cells are dropped.
    pub fn put_scaled(&mut self, x: usize, line: usize, color: Byte) {
        let columns = scale_span(x);
        for y in scale_span(line) {
            if y >= TARGET_HEIGHT {
                break;
            }
            for x in columns.clone() {
                if x < TARGET_WIDTH {
                    self.pixels[y * TARGET_WIDTH + x] = color;
                }
            }
        }
    }

    /// Fill every output row belonging to a native line
    pub fn fill_line(&mut self, line: usize, color: Byte) {
        for y in scale_span(line) {
            if y < TARGET_HEIGHT {
                self.pixels[y * TARGET_WIDTH..(y + 1) * TARGET_WIDTH].fill(color);
            }
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }
}

#[derive(Debug, Default)]
struct Slot {
    frame: FrameBuffer,
    ready: bool,
    published: u64,
}

/// Single-slot mailbox between the compositor and a presenter
///
/// The producer publishes a copy of each completed frame; the consumer
/// takes the most recent one. A frame still being composited never reaches
/// the slot, and a taken frame is the consumer's own copy.
#[derive(Debug, Clone, Default)]
pub struct FrameSlot {
    inner: Arc<(Mutex<Slot>, Condvar)>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand off a completed frame, replacing any frame not yet taken
    pub fn publish(&self, frame: &FrameBuffer) {
        let (lock, ready) = &*self.inner;
        let mut slot = lock.lock().unwrap_or_else(PoisonError::into_inner);
        slot.frame.pixels.copy_from_slice(&frame.pixels);
        slot.ready = true;
        slot.published += 1;
        ready.notify_all();
    }

    /// Take the pending frame, if any
    pub fn try_take(&self, out: &mut FrameBuffer) -> bool {
        let (lock, _) = &*self.inner;
        let mut slot = lock.lock().unwrap_or_else(PoisonError::into_inner);
        Self::take_ready(&mut slot, out)
    }

    /// Block until a frame is published or the timeout elapses
    pub fn wait(&self, out: &mut FrameBuffer, timeout: Duration) -> bool {
        let (lock, ready) = &*self.inner;
        let slot = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut slot, _) = ready
            .wait_timeout_while(slot, timeout, |slot| !slot.ready)
            .unwrap_or_else(PoisonError::into_inner);
        Self::take_ready(&mut slot, out)
    }

    /// Number of frames published so far
    pub fn published(&self) -> u64 {
        let (lock, _) = &*self.inner;
        lock.lock().unwrap_or_else(PoisonError::into_inner).published
    }

    fn take_ready(slot: &mut Slot, out: &mut FrameBuffer) -> bool {
        if !slot.ready {
            return false;
        }
        out.pixels.copy_from_slice(&slot.frame.pixels);
        slot.ready = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    fn assert_tiles(native: usize, target: usize) {
        let mut covered = vec![0u32; target];
        for n in 0..native {
            for t in scale_span(n) {
                covered[t] += 1;
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_scale_tiles_width_and_height() {
        assert_tiles(SCREEN_WIDTH, TARGET_WIDTH);
        assert_tiles(SCREEN_HEIGHT, TARGET_HEIGHT);
    }

    #[test]
    fn test_scale_alternates_block_widths() {
        assert_eq!(scale_span(0), 0..1);
        assert_eq!(scale_span(1), 1..3);
        assert_eq!(scale_span(2), 3..4);
        assert_eq!(scale_span(3), 4..6);
        assert_eq!(scale_span(159), 238..240);
        assert_eq!(scale_span(143), 214..216);
    }

    #[test]
    fn test_put_scaled() {
        let mut frame = FrameBuffer::new();
        frame.put_scaled(1, 1, 3);

        for y in 0..4 {
            for x in 0..4 {
                let expected = if (1..3).contains(&x) && (1..3).contains(&y) { 3 } else { 0 };
                assert_eq!(frame.get(x, y), Some(expected));
            }
        }
        assert_eq!(frame.native(1, 1), Some(3));
    }

    #[test]
    fn test_put_scaled_out_of_bounds_is_dropped() {
        let mut frame = FrameBuffer::new();
        frame.put_scaled(SCREEN_WIDTH, 0, 2);
        frame.put_scaled(0, SCREEN_HEIGHT, 2);
        assert!(frame.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_fill_line() {
        let mut frame = FrameBuffer::new();
        frame.fill_line(1, 2);
        assert!(frame.row(0).unwrap().iter().all(|&p| p == 0));
        assert!(frame.row(1).unwrap().iter().all(|&p| p == 2));
        assert!(frame.row(2).unwrap().iter().all(|&p| p == 2));
        assert!(frame.row(3).unwrap().iter().all(|&p| p == 0));
        assert_eq!(frame.row(TARGET_HEIGHT - 1).map(<[Byte]>::len), Some(TARGET_WIDTH));
        assert!(frame.row(TARGET_HEIGHT).is_none());
    }

    #[test]
    fn test_slot_try_take() {
        let slot = FrameSlot::new();
        let mut out = FrameBuffer::new();
        assert!(!slot.try_take(&mut out));

        let mut frame = FrameBuffer::new();
        frame.fill_line(0, 1);
        slot.publish(&frame);
        frame.fill_line(0, 3); // producer moves on

        assert!(slot.try_take(&mut out));
        assert_eq!(out.row(0).unwrap()[0], 1);
        assert!(!slot.try_take(&mut out));
        assert_eq!(slot.published(), 1);
    }

    #[test]
    fn test_slot_hand_off_across_threads() {
        let slot = FrameSlot::new();
        let producer = slot.clone();

        let handle = thread::spawn(move || {
            let mut frame = FrameBuffer::new();
            frame.fill_line(10, 2);
            producer.publish(&frame);
        });

        let mut out = FrameBuffer::new();
        assert!(slot.wait(&mut out, Duration::from_secs(5)));
        handle.join().unwrap();
        assert_eq!(out.native(0, 10), Some(2));
    }

    #[test]
    fn test_slot_wait_times_out() {
        let slot = FrameSlot::new();
        let mut out = FrameBuffer::new();
        assert!(!slot.wait(&mut out, Duration::from_millis(10)));
    }

    proptest! {
        #[test]
        fn prop_scaled_block_matches_span(x in 0usize..SCREEN_WIDTH, line in 0usize..SCREEN_HEIGHT) {
            let mut frame = FrameBuffer::new();
            frame.put_scaled(x, line, 1);
            let expected = scale_span(x).len() * scale_span(line).len();
            let painted = frame.pixels().iter().filter(|&&p| p == 1).count();
            prop_assert_eq!(painted, expected);
        }
    }
}
