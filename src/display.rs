//! Display Colors
//!
//! The PPU only produces display color indices (0 = lightest, 3 = darkest).
//! Presenters turn them into real pixels with a [`DisplayPalette`].

use crate::common::Byte;
use crate::frame::{FrameBuffer, TARGET_HEIGHT, TARGET_WIDTH};

/// Color for each of the four display color indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPalette {
    argb: [u32; 4],
}

impl Default for DisplayPalette {
    fn default() -> Self {
        Self::GREEN
    }
}

impl DisplayPalette {
    /// Classic Game Boy green palette
    pub const GREEN: Self = Self {
        argb: [0xFF9BBC0F, 0xFF8BAC0F, 0xFF306230, 0xFF0F380F],
    };

    /// Greyscale, exactly representable in RGB565 for small TFT panels
    pub const GRAY: Self = Self {
        argb: [0xFFFFFFFF, 0xFF848284, 0xFF424142, 0xFF000000],
    };

    pub const fn new(argb: [u32; 4]) -> Self {
        Self { argb }
    }

    /// Convert a display color index to ARGB8888
    #[inline]
    pub fn argb(&self, index: Byte) -> u32 {
        self.argb[(index & 0x03) as usize]
    }

    /// Convert a display color index to RGB565
    pub fn rgb565(&self, index: Byte) -> u16 {
        let argb = self.argb(index);
        let r = ((argb >> 16) & 0xFF) as u16;
        let g = ((argb >> 8) & 0xFF) as u16;
        let b = (argb & 0xFF) as u16;
        (r >> 3) << 11 | (g >> 2) << 5 | (b >> 3)
    }

    /// Expand a whole frame into ARGB8888 pixels
    pub fn frame_to_argb(&self, frame: &FrameBuffer, out: &mut [u32]) {
        for (dst, &index) in out.iter_mut().zip(frame.pixels()) {
            *dst = self.argb(index);
        }
    }
}

/// Offset that centers the frame on a panel of the given size
pub fn centered_offset(panel_width: usize, panel_height: usize) -> (usize, usize) {
    (
        panel_width.saturating_sub(TARGET_WIDTH) / 2,
        panel_height.saturating_sub(TARGET_HEIGHT) / 2,
    )
}

/// Draw a frame centered on an RGB565 panel, clipping anything that does not fit
pub fn blit_centered(
    frame: &FrameBuffer,
    palette: &DisplayPalette,
    panel: &mut [u16],
    panel_width: usize,
    panel_height: usize,
) {
    let (x_offset, y_offset) = centered_offset(panel_width, panel_height);

    for y in 0..TARGET_HEIGHT.min(panel_height - y_offset) {
        let Some(src) = frame.row(y) else {
            break;
        };
        let start = (y + y_offset) * panel_width + x_offset;
        let width = TARGET_WIDTH.min(panel_width - x_offset);
        let Some(dst) = panel.get_mut(start..start + width) else {
            break;
        };
        for (d, &index) in dst.iter_mut().zip(src) {
            *d = palette.rgb565(index);
        }
    }
}
