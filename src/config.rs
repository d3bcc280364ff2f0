// src/config.rs

use clap::Parser;

/// Capture the screen and write a PNG of the selected region to stdout.
#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub struct Cli {
    /// Capture the whole screen instead of selecting a region
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Full,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.full { Mode::Full } else { Mode::Interactive }
    }
}

/// Look and feel of the selection overlay.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    pub title: String,
    /// `0x00RRGGBB`
    pub outline_color: u32,
    pub target_fps: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            title: "xsnap".to_string(),
            outline_color: 0x00FF_FFFF,
            target_fps: 120,
        }
    }
}
