//! keynote - play notes from the computer keyboard
//!
//! Run with: cargo run -- --octave 3 --instrument bass

mod app;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use keynote::Instrument;

use app::Keynote;

#[derive(Debug, Parser)]
#[command(version, about = "Toggle notes on and off from the computer keyboard")]
struct Args {
    /// Octave of the leftmost key (C of this octave)
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(0..=8))]
    octave: u32,

    /// Starting instrument: piano or bass (Tab switches while running)
    #[arg(long, default_value_t = Instrument::Piano)]
    instrument: Instrument,

    /// Note length in seconds
    #[arg(long, default_value_t = keynote::DEFAULT_DURATION)]
    duration: f64,

    /// Write log output to this file (the terminal is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    Keynote::new()
        .octave(args.octave)
        .instrument(args.instrument)
        .duration(args.duration)
        .run()
}

fn init_logging(log_file: Option<&Path>) -> EyreResult<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        // stderr would draw over the UI
        None if std::env::var_os("RUST_LOG").is_none() => {
            builder.filter_level(log::LevelFilter::Off);
        }
        None => {}
    }

    builder.try_init().wrap_err("failed to initialise logging")
}
