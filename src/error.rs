// src/error.rs

use std::collections::TryReserveError;

use thiserror::Error;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError};

use crate::geometry::Rect;

/// Failure to obtain the display or its contents.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("can't open display")]
    Connect(#[from] ConnectError),

    #[error("display connection failed")]
    Connection(#[from] ConnectionError),

    #[error("can't get image")]
    Reply(#[from] ReplyError),

    #[error("unsupported framebuffer: expected {expected} bytes for {width}x{height}, got {actual}")]
    Format {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("overlay window: {0}")]
    Window(String),

    #[error("overlay input grab failed")]
    GrabConnection(#[from] ConnectionError),

    #[error("overlay input grab failed")]
    GrabReply(#[from] ReplyError),
}

impl From<minifb::Error> for OverlayError {
    fn from(err: minifb::Error) -> Self {
        OverlayError::Window(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("nothing to encode: region {0:?} is empty")]
    EmptyRegion(Rect),

    #[error("region {region:?} is outside the {width}x{height} framebuffer")]
    OutOfBounds { region: Rect, width: u32, height: u32 },

    #[error("can't allocate row buffer")]
    Alloc(#[from] TryReserveError),

    #[error("png encoding failed")]
    Png(#[from] png::EncodingError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
