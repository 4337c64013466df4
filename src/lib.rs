//! `iconographer`
//!
//! Generates app icons from an SVG logo: store icons, bordered icons, grayscale and splash
//! variants. The artwork is rasterized by an external tool (or resvg) and then composited.

pub mod colour;
pub mod compose;
pub mod default_icons;
pub mod manifest;
pub mod rasterize;
pub mod svg;

use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use log::{info, warn};

pub use colour::Colour;
pub use compose::compose_bordered_icon;
pub use manifest::{IconSpec, Manifest};
pub use rasterize::{Background, RasterizeError, Rasterizer};

/// Errors that can occur while generating icons.
#[derive(Debug)]
pub enum IconError {
    /// The artwork for an icon does not exist.
    MissingSourceFile {
        /// Where the artwork was expected.
        path: PathBuf,
    },
    /// The artwork is not well-formed SVG.
    Parse {
        /// The artwork.
        path: PathBuf,
        /// What is wrong with it.
        source: svg::SvgError,
    },
    /// The artwork could not be rasterized.
    Rasterize(RasterizeError),
    /// The border is too wide for the icon, leaving no room for the artwork.
    InvalidGeometry {
        /// The icon being generated.
        output: PathBuf,
        /// Side length of the icon.
        size: u32,
        /// Width of the border.
        border_width: u32,
    },
    /// The artwork's accent colour is not a colour.
    InvalidColour {
        /// The text of the accent colour.
        value: String,
    },
    /// A bitmap could not be decoded or encoded.
    Image {
        /// The bitmap file.
        path: PathBuf,
        /// What went wrong.
        source: image::ImageError,
    },
    /// A file or directory could not be read or written.
    Io {
        /// The file or directory.
        path: PathBuf,
        /// What went wrong.
        source: io::Error,
    },
    /// A manifest is not valid JSON or is missing fields.
    Manifest {
        /// The manifest file.
        path: PathBuf,
        /// What is wrong with it.
        source: serde_json::Error,
    },
}

impl fmt::Display for IconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconError::MissingSourceFile { path } => {
                write!(f, "SVG file not found at {}", path.display())
            }
            IconError::Parse { path, source } => {
                write!(f, "could not parse {}: {source}", path.display())
            }
            IconError::Rasterize(err) => write!(f, "error rasterizing: {err}"),
            IconError::InvalidGeometry {
                output,
                size,
                border_width,
            } => write!(
                f,
                "{}: a {border_width}px border leaves no room in a {size}px icon",
                output.display()
            ),
            IconError::InvalidColour { value } => {
                write!(f, "accent colour `{value}` is not a valid colour")
            }
            IconError::Image { path, source } => {
                write!(f, "error processing image {}: {source}", path.display())
            }
            IconError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            IconError::Manifest { path, source } => {
                write!(f, "invalid manifest {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for IconError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IconError::Parse { source, .. } => Some(source),
            IconError::Rasterize(err) => Some(err),
            IconError::Image { source, .. } => Some(source),
            IconError::Io { source, .. } => Some(source),
            IconError::Manifest { source, .. } => Some(source),
            IconError::MissingSourceFile { .. }
            | IconError::InvalidGeometry { .. }
            | IconError::InvalidColour { .. } => None,
        }
    }
}

impl From<RasterizeError> for IconError {
    fn from(err: RasterizeError) -> Self {
        IconError::Rasterize(err)
    }
}

/// Checks every icon before any work is done, so that a run fails fast rather than
/// half-way through.
///
/// # Arguments
/// * `icons`: The icons to check.
///
/// # Returns
/// `Ok(())` if every source exists and every border fits.
///
/// # Errors
/// The first [`IconError::MissingSourceFile`] or [`IconError::InvalidGeometry`] found.
fn check_icons(icons: &[IconSpec]) -> Result<(), IconError> {
    for icon in icons {
        if !icon.source.is_file() {
            return Err(IconError::MissingSourceFile {
                path: icon.source.clone(),
            });
        }
        icon.center_size()?;
    }
    Ok(())
}

/// Writes an icon as PNG, creating parent directories as needed.
///
/// # Arguments
/// * `icon`: The icon.
/// * `path`: Where to write it.
///
/// # Errors
/// [`IconError::Io`] if a directory cannot be created, [`IconError::Image`] if the PNG
/// cannot be written.
fn save_icon(icon: &image::RgbaImage, path: &Path) -> Result<(), IconError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| IconError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    icon.save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| IconError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// Generates every icon in a manifest.
///
/// The run stops at the first icon that fails; icons already written stay written and the
/// failing icon is never written.
///
/// # Arguments
/// * `manifest`: What to generate and where to put it.
/// * `rasterizer`: What renders the artwork.
///
/// # Returns
/// The paths of the icons written, in manifest order.
///
/// # Errors
/// The [`IconError`] of the first icon that could not be generated.
pub fn generate_icons(
    manifest: &Manifest,
    rasterizer: &dyn Rasterizer,
) -> Result<Vec<PathBuf>, IconError> {
    info!("Output directory: {}", manifest.output_dir.display());
    std::fs::create_dir_all(&manifest.output_dir).map_err(|source| IconError::Io {
        path: manifest.output_dir.clone(),
        source,
    })?;

    check_icons(&manifest.icons)?;

    let mut written = Vec::with_capacity(manifest.icons.len());
    for icon_spec in &manifest.icons {
        info!(
            "Generating {} from {}...",
            icon_spec.output.display(),
            icon_spec.source.display()
        );
        let icon = compose_bordered_icon(icon_spec, rasterizer)?;

        let path = manifest.output_path(icon_spec);
        save_icon(&icon, &path)?;
        match std::fs::metadata(&path) {
            Ok(metadata) => info!("Generated {} ({} bytes)", path.display(), metadata.len()),
            Err(err) => warn!("Generated {} but cannot stat it: {err}", path.display()),
        }

        written.push(path);
    }

    Ok(written)
}
