//! monosynth - play one voice from the computer keyboard
//!
//! Run with: cargo run -- --help

mod app;
mod cli;
mod ui;

use clap::Parser;
use color_eyre::eyre::WrapErr;

use app::Monosynth;
use cli::Args;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = Args::parse();

    if args.list_devices {
        return app::list_devices();
    }

    let config = args
        .voice_config()
        .wrap_err("invalid envelope settings")?;

    Monosynth::new(config)
        .base_frequency(args.base_frequency)
        .hold_timeout(args.hold_timeout)
        .device(args.device)
        .run()
}
