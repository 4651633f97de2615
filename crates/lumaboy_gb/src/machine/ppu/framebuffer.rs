use serde::{Deserialize, Serialize};

use lumaboy_common::Color;

use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

const FRAME_LEN: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Front/back pair of 160x144 RGB555 frames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct FrameBuffer {
    front: Vec<u16>,
    back: Vec<u16>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            front: vec![0x7FFF; FRAME_LEN],
            back: vec![0x7FFF; FRAME_LEN],
        }
    }
}

impl FrameBuffer {
    pub(super) fn line_mut(&mut self, ly: usize) -> &mut [u16] {
        &mut self.back[ly * SCREEN_WIDTH..(ly + 1) * SCREEN_WIDTH]
    }

    pub(super) fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }

    pub(super) fn fill_front(&mut self, color: u16) {
        self.front.fill(color);
    }

    pub(super) fn front(&self) -> FrameBufferView<'_> {
        FrameBufferView {
            pixels: &self.front,
        }
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        if self.front.len() != FRAME_LEN || self.back.len() != FRAME_LEN {
            return Err("frame buffer size mismatch".to_string());
        }
        Ok(())
    }
}

/// Read-only view of the last completed frame.
///
/// Pixels are row-major RGB555 values (`0bbbbbgggggrrrrr`).
#[derive(Copy, Clone, Debug)]
pub struct FrameBufferView<'a> {
    pixels: &'a [u16],
}

impl<'a> FrameBufferView<'a> {
    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    pub fn pixels(&self) -> &'a [u16] {
        self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> u16 {
        self.pixels[y * SCREEN_WIDTH + x]
    }

    /// Expand into `out` as packed RGB24. `out` must hold 160*144*3 bytes.
    pub fn write_rgb24(&self, out: &mut [u8]) {
        for (dst, &src) in out.chunks_exact_mut(3).zip(self.pixels) {
            let color = Color::from_rgb555(src);
            dst.copy_from_slice(&[color.r, color.g, color.b]);
        }
    }

    /// Expand into a new RGBA32 buffer (canvas `ImageData` layout).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FRAME_LEN * 4);
        for &src in self.pixels {
            let color = Color::from_rgb555(src);
            out.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        out
    }
}
