//! kmsprint - print connectors, encoders, CRTCs and display modes of a DRM card

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kmsprint::{device, walker, Config};

#[derive(Parser, Debug)]
#[command(name = "kmsprint")]
#[command(about = "Print the KMS topology and display modes of a DRM card", long_about = None)]
#[command(disable_help_flag = true)]
struct Args {
    /// DEVICE is the path to DRM card to open
    #[arg(long, value_name = "DEVICE")]
    device: Option<PathBuf>,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also list every CRTC, plane and framebuffer
    #[arg(long)]
    objects: bool,

    /// Enable verbose debug output on stderr
    #[arg(short, long)]
    debug: bool,

    /// Print usage
    #[arg(short, long)]
    help: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.help {
        let _ = Args::command().print_help();
        std::process::exit(255);
    }

    // Logs go to stderr so the report on stdout stays clean
    let default_filter = if args.debug {
        "debug,kmsprint=debug"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    debug!(?config, "Configuration");

    // --device, then the environment, then the config file
    let device_path = args
        .device
        .clone()
        .or_else(|| {
            std::env::var_os(device::DEVICE_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .or_else(|| config.device.clone());

    let card = device::open(device_path.as_deref()).context("Failed to read DRM card")?;
    info!(
        connectors = card.connectors.len(),
        has_atomic = card.has_atomic,
        "Card snapshot taken"
    );

    let mut out = std::io::stdout().lock();
    walker::print_modes(&card, &mut out)?;

    if args.objects || config.show_objects {
        walker::print_objects(&card, &mut out)?;
    }

    out.flush()?;
    Ok(())
}
