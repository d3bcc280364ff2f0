use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

mod capture;
mod compositor;
mod config;
mod encoder;
mod error;
mod framebuffer;
mod geometry;
mod overlay;
mod selection;

use capture::Display;
use config::{Cli, Mode, OverlayConfig};
use overlay::WindowOverlay;

/// Exit status when the user backs out of the selection.
const EXIT_CANCELLED: u8 = 130;

enum Status {
    Written,
    Cancelled,
}

fn init_logger() {
    env_logger::builder()
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "[{style}{}{style:#} {}:{}] {}",
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

fn run(cli: &Cli) -> Result<Status> {
    let display = Display::connect()?;
    let frame = display.capture()?;

    let region = match cli.mode() {
        Mode::Full => frame.bounds(),
        Mode::Interactive => {
            // the overlay is dropped before encoding so the screen is released right away
            let selected = {
                let mut overlay = WindowOverlay::open(&display, &frame, &OverlayConfig::default())
                    .context("Can't create overlay")?;
                selection::select_region(&mut overlay, &frame)?
            };
            match selected {
                Some(region) => region,
                None => return Ok(Status::Cancelled),
            }
        }
    };

    let mut sink = BufWriter::new(io::stdout().lock());
    encoder::encode(&mut sink, &frame, region).context("Could not write image")?;
    sink.flush().context("Could not write image")?;
    Ok(Status::Written)
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(Status::Written) => ExitCode::SUCCESS,
        Ok(Status::Cancelled) => {
            debug!("selection cancelled");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
