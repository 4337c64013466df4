//! `iconographer`
//!
//! Generates app icons from an SVG logo.
//!
//! Usage: `iconographer [MANIFEST.json]`. Without a manifest the default icon table is
//! generated from `assets/logo.svg` into `assets/`.

use std::{path::PathBuf, process::ExitCode};

use iconographer::{generate_icons, IconError, Manifest};
use log::{error, info};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Loads the manifest named on the command line, or the default one, and generates it.
///
/// # Errors
/// Whatever stopped the run.
fn run() -> Result<(), IconError> {
    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }

    let manifest = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!("Manifest: {}", path.display());
            Manifest::load(&path)?
        }
        None => Manifest::default(),
    };

    let rasterizer = manifest.rasterizer.build();
    let written = generate_icons(&manifest, rasterizer.as_ref())?;
    info!("Generated {} icons", written.len());

    Ok(())
}
