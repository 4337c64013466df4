//! `manifest`
//!
//! Describes which icons to generate and how to rasterize them. A manifest can be loaded
//! from JSON; otherwise the built-in table from [`crate::default_icons`] is used.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    colour::Colour,
    default_icons::{default_icons, DEFAULT_OUTPUT_DIR},
    rasterize::{
        InkscapeRasterizer, Rasterizer, ResvgRasterizer, DEFAULT_POLL_INTERVAL, DEFAULT_PROGRAM,
        DEFAULT_TIMEOUT,
    },
    IconError,
};

/// One icon to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSpec {
    /// File name of the finished icon, relative to the output directory.
    pub output: PathBuf,
    /// The SVG artwork to render.
    pub source: PathBuf,
    /// Side length of the finished icon in pixels.
    pub size: u32,
    /// Width of the border ring in pixels. The artwork is rendered at
    /// `size - 2 * border_width`.
    #[serde(default)]
    pub border_width: u32,
    /// Colour behind everything, transparent if unset.
    #[serde(default)]
    pub background: Option<Colour>,
    /// Whether to convert the finished icon to grayscale.
    #[serde(default)]
    pub grayscale: bool,
}

impl IconSpec {
    /// Creates a new [`IconSpec`] with a transparent background, in colour.
    ///
    /// # Arguments
    /// * `output`: File name of the finished icon.
    /// * `source`: The SVG artwork.
    /// * `size`: Side length of the finished icon.
    /// * `border_width`: Width of the border ring.
    ///
    /// # Returns
    /// The icon spec.
    pub fn new(
        output: impl Into<PathBuf>,
        source: impl Into<PathBuf>,
        size: u32,
        border_width: u32,
    ) -> Self {
        IconSpec {
            output: output.into(),
            source: source.into(),
            size,
            border_width,
            background: None,
            grayscale: false,
        }
    }

    /// Puts a solid background behind the icon.
    #[must_use]
    pub fn with_background(mut self, colour: Colour) -> Self {
        self.background = Some(colour);
        self
    }

    /// Converts the icon to grayscale once composed.
    #[must_use]
    pub fn in_grayscale(mut self) -> Self {
        self.grayscale = true;
        self
    }

    /// Gets the side length the artwork is rendered at.
    ///
    /// # Returns
    /// `size - 2 * border_width`.
    ///
    /// # Errors
    /// [`IconError::InvalidGeometry`] if the border leaves no room for the artwork.
    pub fn center_size(&self) -> Result<u32, IconError> {
        match self.border_width.checked_mul(2) {
            Some(borders) if borders < self.size => Ok(self.size - borders),
            _ => Err(IconError::InvalidGeometry {
                output: self.output.clone(),
                size: self.size,
                border_width: self.border_width,
            }),
        }
    }
}

/// Which rasterizer to use, and its settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum RasterizerConfig {
    /// Shell out to Inkscape.
    Inkscape {
        /// The program to run.
        #[serde(default = "default_program")]
        program: String,
        /// How long to wait for the output after the program exits, in ms.
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
        /// How often to check for the output, in ms.
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: u64,
    },
    /// Render in-process with resvg.
    Resvg,
}

/// Serde default for [`RasterizerConfig::Inkscape::program`].
fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

/// Serde default for [`RasterizerConfig::Inkscape::timeout_ms`].
fn default_timeout_ms() -> u64 {
    u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
}

/// Serde default for [`RasterizerConfig::Inkscape::poll_interval_ms`].
fn default_poll_interval_ms() -> u64 {
    u64::try_from(DEFAULT_POLL_INTERVAL.as_millis()).unwrap_or(u64::MAX)
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        RasterizerConfig::Inkscape {
            program: default_program(),
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl RasterizerConfig {
    /// Creates the configured rasterizer.
    ///
    /// # Returns
    /// The rasterizer, ready to use.
    pub fn build(&self) -> Box<dyn Rasterizer> {
        match self {
            RasterizerConfig::Inkscape {
                program,
                timeout_ms,
                poll_interval_ms,
            } => Box::new(InkscapeRasterizer::new(
                program.clone(),
                Duration::from_millis(*timeout_ms),
                Duration::from_millis(*poll_interval_ms),
            )),
            RasterizerConfig::Resvg => Box::new(ResvgRasterizer),
        }
    }
}

/// Everything needed for a run: where to write, how to render, and what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Directory the finished icons are written to. Created if missing.
    pub output_dir: PathBuf,
    /// How to rasterize the artwork.
    #[serde(default)]
    pub rasterizer: RasterizerConfig,
    /// The icons to generate, in order.
    pub icons: Vec<IconSpec>,
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            rasterizer: RasterizerConfig::default(),
            icons: default_icons(),
        }
    }
}

impl Manifest {
    /// Loads a manifest from a JSON file.
    ///
    /// Relative paths in the manifest are resolved against the directory containing it.
    ///
    /// # Arguments
    /// * `path`: The manifest file.
    ///
    /// # Returns
    /// The manifest with resolved paths.
    ///
    /// # Errors
    /// [`IconError::Io`] if the file cannot be read, [`IconError::Manifest`] if it is not a
    /// valid manifest.
    pub fn load(path: &Path) -> Result<Self, IconError> {
        let text = std::fs::read_to_string(path).map_err(|source| IconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&text).map_err(|source| IconError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;

        let root = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(manifest.resolved_against(root))
    }

    /// Resolves relative paths against `root`; absolute paths are kept as they are.
    ///
    /// # Arguments
    /// * `root`: The directory relative paths are relative to.
    ///
    /// # Returns
    /// The manifest with resolved paths.
    #[must_use]
    pub fn resolved_against(mut self, root: &Path) -> Self {
        self.output_dir = root.join(&self.output_dir);
        for icon in &mut self.icons {
            icon.source = root.join(&icon.source);
        }
        self
    }

    /// Gets where an icon will be written.
    ///
    /// # Arguments
    /// * `icon`: The icon.
    ///
    /// # Returns
    /// The icon's output path inside the output directory.
    pub fn output_path(&self, icon: &IconSpec) -> PathBuf {
        self.output_dir.join(&icon.output)
    }
}
