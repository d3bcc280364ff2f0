// src/overlay.rs

use std::collections::VecDeque;

use log::{debug, trace, warn};
use minifb::{CursorStyle, KeyRepeat, MouseMode, Window, WindowOptions};
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{self, ConfigureWindowAux, GrabMode, GrabStatus, StackMode};

use crate::capture::Display;
use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::framebuffer::FrameBuffer;
use crate::geometry::Rect;
use crate::selection::{Event, MouseButton};

/// Full-screen surface the selection is drawn on.
pub trait Overlay {
    /// Copies `region` of the capture onto the surface.
    fn blit(&mut self, frame: &FrameBuffer, region: Rect);

    /// Draws an unfilled one pixel rectangle, edges inclusive.
    fn draw_outline(&mut self, rect: Rect);

    /// Re-acquires exclusive keyboard input.
    fn grab_input(&mut self) -> Result<(), OverlayError>;

    /// Pushes pending drawing to the screen.
    fn present(&mut self) -> Result<(), OverlayError>;

    /// Blocks until the next input event. `None` once the overlay is gone.
    fn next_event(&mut self) -> Result<Option<Event>, OverlayError>;
}

/// `0x00RRGGBB` pixel buffer backing the overlay window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    outline_color: u32,
}

impl Surface {
    pub fn new(width: usize, height: usize, outline_color: u32) -> Self {
        Surface {
            width,
            height,
            pixels: vec![0; width * height],
            outline_color,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as u32, self.height as u32)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn put(&mut self, x: i64, y: i64) {
        if self.bounds().contains(x, y) {
            self.pixels[y as usize * self.width + x as usize] = self.outline_color;
        }
    }

    /// Half-open copy of `region`, clipped to both the capture and the surface.
    pub fn blit(&mut self, frame: &FrameBuffer, region: Rect) {
        let region = region.clip(&frame.bounds()).clip(&self.bounds());
        if region.is_degenerate() {
            return;
        }

        let (left, width) = (region.left as u32, region.width);
        for y in region.top as u32..region.bottom() as u32 {
            let Some(pixels) = frame.row_pixels(y, left, width) else {
                continue;
            };
            let start = y as usize * self.width + left as usize;
            for (dst, px) in self.pixels[start..start + width as usize]
                .iter_mut()
                .zip(pixels)
            {
                *dst = px.to_xrgb();
            }
        }
    }

    /// Edges inclusive, like `XDrawRectangle`; anything off the surface is dropped.
    pub fn draw_outline(&mut self, rect: Rect) {
        let (x0, y0) = (rect.left as i64, rect.top as i64);
        let (x1, y1) = (rect.right(), rect.bottom());
        let (w, h) = (self.width as i64, self.height as i64);

        for x in x0.max(0)..=x1.min(w - 1) {
            self.put(x, y0);
            self.put(x, y1);
        }
        for y in y0.max(0)..=y1.min(h - 1) {
            self.put(x0, y);
            self.put(x1, y);
        }
    }
}

/// X11 id of a native window handle, if it is one.
fn x11_window_id(raw: RawWindowHandle) -> Option<u32> {
    match raw {
        RawWindowHandle::Xlib(handle) => u32::try_from(handle.window).ok(),
        RawWindowHandle::Xcb(handle) => Some(handle.window.get()),
        _ => None,
    }
}

const BUTTONS: [(minifb::MouseButton, MouseButton); 3] = [
    (minifb::MouseButton::Left, MouseButton::Primary),
    (minifb::MouseButton::Right, MouseButton::Secondary),
    (minifb::MouseButton::Middle, MouseButton::Middle),
];

/// Input state seen on the previous pump, used to turn polled state into events.
#[derive(Debug, Default)]
struct InputSnapshot {
    exposed: bool,
    active: bool,
    pos: Option<(i32, i32)>,
    down: [bool; 3],
}

/// Borderless minifb window showing the frozen capture, with the keyboard grabbed
/// through the capture's X connection.
///
/// The grab is released and the window closed when this value is dropped.
pub struct WindowOverlay<'a> {
    display: &'a Display,
    window: Window,
    xid: Option<u32>,
    grabbed: bool,
    surface: Surface,
    input: InputSnapshot,
    pending: VecDeque<Event>,
}

impl<'a> WindowOverlay<'a> {
    pub fn open(
        display: &'a Display,
        frame: &FrameBuffer,
        config: &OverlayConfig,
    ) -> Result<Self, OverlayError> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;

        let mut window = Window::new(
            &config.title,
            width,
            height,
            WindowOptions {
                borderless: true,
                resize: false,
                ..WindowOptions::default()
            },
        )?;
        window.set_position(0, 0);
        window.set_target_fps(config.target_fps);
        window.set_cursor_style(CursorStyle::Crosshair);

        let xid = window
            .window_handle()
            .ok()
            .and_then(|handle| x11_window_id(handle.as_raw()));
        if xid.is_none() {
            warn!("overlay is not an X11 window, keyboard will not be grabbed");
        }
        debug!("overlay opened at {width}x{height}, window {xid:?}");

        let mut overlay = WindowOverlay {
            display,
            window,
            xid,
            grabbed: false,
            surface: Surface::new(width, height, config.outline_color),
            input: InputSnapshot::default(),
            pending: VecDeque::new(),
        };
        overlay.grab_input()?;
        Ok(overlay)
    }

    /// Diffs the window's input state against the previous pump.
    ///
    /// While the keyboard is grabbed the server delivers key presses to the capture
    /// connection instead of the window, so they are drained from there.
    fn poll_input(&mut self) -> Result<(), OverlayError> {
        let input = &mut self.input;

        if !input.exposed {
            input.exposed = true;
            input.active = true;
            self.pending.push_back(Event::Exposed);
        }

        let active = self.window.is_active();
        if input.active && !active {
            self.pending.push_back(Event::FocusLost);
        }
        input.active = active;

        let pos = self
            .window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x as i32, y as i32));
        if let Some((x, y)) = pos {
            if input.pos != pos {
                self.pending.push_back(Event::PointerMoved { x, y });
            }
        }
        if pos.is_some() {
            input.pos = pos;
        }

        let (x, y) = input.pos.unwrap_or((0, 0));
        for (i, (raw, button)) in BUTTONS.iter().enumerate() {
            let down = self.window.get_mouse_down(*raw);
            if down != input.down[i] {
                input.down[i] = down;
                self.pending.push_back(if down {
                    Event::ButtonPressed { button: *button, x, y }
                } else {
                    Event::ButtonReleased { button: *button, x, y }
                });
            }
        }

        let mut key_pressed = !self.window.get_keys_pressed(KeyRepeat::No).is_empty();
        if self.grabbed {
            while let Some(event) = self.display.conn().poll_for_event()? {
                key_pressed |= matches!(event, x11rb::protocol::Event::KeyPress(_));
            }
        }
        if key_pressed {
            self.pending.push_back(Event::KeyPressed);
        }
        Ok(())
    }
}

impl Overlay for WindowOverlay<'_> {
    fn blit(&mut self, frame: &FrameBuffer, region: Rect) {
        self.surface.blit(frame, region);
    }

    fn draw_outline(&mut self, rect: Rect) {
        self.surface.draw_outline(rect);
    }

    /// Raises the overlay and grabs the keyboard. A grab the server refuses (window not
    /// yet viewable, or another client holds it) is retried on the next pump.
    fn grab_input(&mut self) -> Result<(), OverlayError> {
        let Some(xid) = self.xid else {
            return Ok(());
        };
        let conn = self.display.conn();

        xproto::configure_window(
            conn,
            xid,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        let reply = xproto::grab_keyboard(
            conn,
            false,
            xid,
            x11rb::CURRENT_TIME,
            GrabMode::ASYNC,
            GrabMode::ASYNC,
        )?
        .reply()?;

        self.grabbed = reply.status == GrabStatus::SUCCESS;
        trace!("keyboard grab on {xid}: {:?}", reply.status);
        Ok(())
    }

    fn present(&mut self) -> Result<(), OverlayError> {
        let (width, height) = (self.surface.width, self.surface.height);
        self.window
            .update_with_buffer(self.surface.pixels(), width, height)?;
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<Event>, OverlayError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if !self.window.is_open() {
                return Ok(None);
            }
            if !self.grabbed && self.xid.is_some() {
                self.grab_input()?;
            }
            self.poll_input()?;
            if self.pending.is_empty() {
                self.window.update();
            }
        }
    }
}

impl Drop for WindowOverlay<'_> {
    fn drop(&mut self) {
        if self.grabbed {
            let conn = self.display.conn();
            let released =
                xproto::ungrab_keyboard(conn, x11rb::CURRENT_TIME).and_then(|_| conn.flush());
            if let Err(err) = released {
                warn!("can't release keyboard grab: {err}");
            }
        }
        debug!("overlay closed");
    }
}
