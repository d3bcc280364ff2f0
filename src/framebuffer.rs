// src/framebuffer.rs

use crate::error::CaptureError;
use crate::geometry::Rect;

/// Blue, green, red, padding.
pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    fn from_bgrx(px: &[u8]) -> Self {
        Rgb { r: px[2], g: px[1], b: px[0] }
    }

    /// `0x00RRGGBB`, the layout minifb expects.
    pub fn to_xrgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

/// Read-only snapshot of the whole display in BGRX order.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameBuffer {
    pub fn from_bgrx(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(CaptureError::Format {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(FrameBuffer { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Bounds-checked pixel lookup.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some(Rgb::from_bgrx(&self.data[offset..offset + BYTES_PER_PIXEL]))
    }

    /// Pixels `[left, left + width)` of row `y`, or `None` if the span leaves the buffer.
    pub fn row_pixels(
        &self,
        y: u32,
        left: u32,
        width: u32,
    ) -> Option<impl Iterator<Item = Rgb> + '_> {
        let end = left.checked_add(width)?;
        if y >= self.height || end > self.width {
            return None;
        }
        Some((left..end).filter_map(move |x| self.pixel_at(x, y)))
    }
}
