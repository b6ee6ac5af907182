use std::path::PathBuf;
use std::{panic, process};

use anyhow::Context;
use clap::{Arg, Command};
use log::error;
use tracing_subscriber::EnvFilter;

use crate::assets::Assets;
use crate::capture::CaptureSource;
use crate::config::{Config, app_name, version};
use crate::display::PreviewStage;
use crate::encoder::RecordingStage;
use crate::gui::App;
use crate::pipeline::coordinator::Coordinator;
use crate::pipeline::settings::SessionSettings;
use crate::utils::gist;

pub mod assets;
pub mod capture;
pub mod config;
pub mod display;
pub mod encoder;
pub mod gui;
pub mod pipeline;
pub mod utils;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // kill the main thread as soon as a secondary thread panics
    let orig_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // invoke the default handler and exit the process
        orig_hook(panic_info);
        process::exit(105);
    }));

    if let Err(e) = run() {
        error!("{e:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let matches = Command::new(app_name())
        .version(version())
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new("device")
                .value_name("CAPTURE DEVICE")
                .help("V4L2 device to capture from, e.g. /dev/video0, or `test` for a test pattern.")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .value_name("OUTPUT FILE")
                .help("File recordings are written to (MP4).")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .get_matches();

    let device = matches
        .get_one::<String>("device")
        .context("missing capture device")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .context("missing output file")?;

    let config = Config::new();

    // gracefully close the session when receiving SIGINT, SIGTERM, or SIGHUP
    config
        .sos
        .install_ctrlc()
        .context("failed to set the Ctrl-C handler")?;

    gist::init().context("failed to initialize GStreamer")?;

    let settings = SessionSettings::new(device, output.clone()).context("invalid capture device")?;
    let assets = Assets::load().context("failed to load assets")?;

    let capture = CaptureSource::new(&settings.capture).context("failed to create the capture pipeline")?;
    let preview = PreviewStage::new(&settings.preview).context("failed to create the preview pipeline")?;
    let recording =
        RecordingStage::new(&settings.recording).context("failed to create the recording pipeline")?;

    let mut session = Coordinator::new(capture, preview, recording, config.coordinator_options());
    session.start().context("failed to start capture")?;

    gui::run(App::new(session, assets, &config), &config).context("window system failed")?;

    Ok(())
}
