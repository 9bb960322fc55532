//! Binary entrypoint for sidecar: a companion window that docks beside the
//! frontmost browser window.
use std::{path::PathBuf, process};

use clap::{Parser, ValueEnum};
use logging as logshared;
use sidecar_attach::Side;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*};

/// Event loop and attacher wiring.
#[cfg(target_os = "macos")]
mod app;
/// The companion window as an attachment delegate.
#[cfg(target_os = "macos")]
mod companion;
mod settings;

use crate::settings::Settings;

/// Side of the browser window to dock to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for Side {
    fn from(s: SideArg) -> Self {
        match s {
            SideArg::Left => Self::Left,
            SideArg::Right => Self::Right,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "sidecar",
    about = "A companion window that docks beside your browser",
    version
)]
/// Command-line interface for the `sidecar` binary.
struct Cli {
    /// Bundle identifier of the browser to attach to (default: system browser)
    #[arg(long, value_name = "BUNDLE_ID")]
    browser: Option<String>,

    /// Side of the browser window to dock to
    #[arg(long, value_enum)]
    side: Option<SideArg>,

    /// Companion window width in points
    #[arg(long, value_name = "PX")]
    width: Option<f64>,

    /// Float freely instead of docking
    #[arg(long)]
    no_attach: bool,

    /// Optional path to the settings file (default: ~/.sidecar/settings.json)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Logging controls
    #[command(flatten)]
    log: logshared::LogArgs,
}

impl Cli {
    /// Overlay command-line choices on persisted settings.
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(b) = &self.browser {
            settings.browser = Some(b.clone());
        }
        if let Some(side) = self.side {
            settings.side = side.into();
        }
        match self.width {
            Some(w) if w > 0.0 => settings.companion_width = w,
            Some(w) => warn!("ignoring non-positive width {}", w),
            None => {}
        }
        if self.no_attach {
            settings.attach_enabled = false;
        }
        settings
    }
}

fn main() {
    let cli = Cli::parse();

    let final_spec = cli.log.spec();
    let env_filter = logshared::env_filter_from_spec(&final_spec);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().without_time())
        .try_init()
        .ok();

    let path = cli.settings.clone().unwrap_or_else(settings::default_path);
    let stored = Settings::load(&path).unwrap_or_else(|e| {
        warn!("{}; using defaults", e);
        Settings::default()
    });
    let settings = cli.apply(stored.clone());
    if settings != stored {
        match settings.save(&path) {
            Ok(()) => debug!("settings updated from command line"),
            Err(e) => warn!("{}", e),
        }
    }
    debug!("effective settings: {:?}", settings);

    run(settings);
}

#[cfg(target_os = "macos")]
fn run(settings: Settings) {
    if let Err(e) = app::run(&settings) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

#[cfg(not(target_os = "macos"))]
fn run(_settings: Settings) {
    tracing::error!("sidecar needs macOS Accessibility to track browser windows");
    process::exit(1);
}
