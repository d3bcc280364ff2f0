// src/capture.rs

use log::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, ImageFormat};
use x11rb::rust_connection::RustConnection;

use crate::error::CaptureError;
use crate::framebuffer::FrameBuffer;

/// Connection to the X server and the screen being captured.
pub struct Display {
    conn: RustConnection,
    screen_num: usize,
}

impl Display {
    /// Connects to `$DISPLAY`.
    pub fn connect() -> Result<Self, CaptureError> {
        let (conn, screen_num) = x11rb::connect(None)?;
        Ok(Display { conn, screen_num })
    }

    pub fn conn(&self) -> &RustConnection {
        &self.conn
    }

    pub fn screen_size(&self) -> (u16, u16) {
        let screen = &self.conn.setup().roots[self.screen_num];
        (screen.width_in_pixels, screen.height_in_pixels)
    }

    /// Grabs the root window as a 32 bpp Z-pixmap.
    pub fn capture(&self) -> Result<FrameBuffer, CaptureError> {
        let root = self.conn.setup().roots[self.screen_num].root;
        let (width, height) = self.screen_size();

        let reply = xproto::get_image(
            &self.conn,
            ImageFormat::Z_PIXMAP,
            root,
            0,
            0,
            width,
            height,
            u32::MAX,
        )?
        .reply()?;
        debug!(
            "captured {width}x{height} at depth {}, {} bytes",
            reply.depth,
            reply.data.len()
        );

        FrameBuffer::from_bgrx(width as u32, height as u32, reply.data)
    }
}
