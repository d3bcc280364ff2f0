// src/encoder.rs

use std::io::Write;

use log::debug;

use crate::error::EncodeError;
use crate::framebuffer::FrameBuffer;
use crate::geometry::Rect;

pub const TITLE_KEY: &str = "Title";
pub const TITLE: &str = "Screenshot";

/// Streams `region` of `frame` to `sink` as an 8-bit RGB PNG, one row at a time.
///
/// Bytes already handed to `sink` stay there if encoding fails halfway.
pub fn encode<W: Write>(sink: W, frame: &FrameBuffer, region: Rect) -> Result<(), EncodeError> {
    if region.is_degenerate() {
        return Err(EncodeError::EmptyRegion(region));
    }
    if !frame.bounds().contains_rect(&region) {
        return Err(EncodeError::OutOfBounds {
            region,
            width: frame.width(),
            height: frame.height(),
        });
    }

    let (left, top) = (region.left as u32, region.top as u32);
    let mut row = Vec::new();
    row.try_reserve_exact(region.width as usize * 3)?;

    let mut encoder = png::Encoder::new(sink, region.width, region.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.add_text_chunk(TITLE_KEY.to_string(), TITLE.to_string())?;

    let mut writer = encoder.write_header()?;
    let mut stream = writer.stream_writer()?;
    for y in top..top + region.height {
        row.clear();
        let pixels = frame
            .row_pixels(y, left, region.width)
            .ok_or(EncodeError::OutOfBounds {
                region,
                width: frame.width(),
                height: frame.height(),
            })?;
        for px in pixels {
            row.extend_from_slice(&[px.r, px.g, px.b]);
        }
        stream.write_all(&row)?;
    }
    stream.finish()?;

    debug!("encoded {}x{} region at ({}, {})", region.width, region.height, left, top);
    Ok(())
}
