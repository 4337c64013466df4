//! `rasterize`
//!
//! Turns vector artwork into bitmaps, either by asking an external tool to do it or by
//! rendering in-process.

use std::{
    ffi::OsString,
    fmt, io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
    thread,
    time::Duration,
};

use log::{debug, info};
use resvg::tiny_skia;

use crate::{colour::Colour, svg::parse_svg};

/// The external rasterizer used when none is configured.
pub const DEFAULT_PROGRAM: &str = "inkscape";

/// How long to wait for an external rasterizer's output to appear after it exits.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How often to check whether an external rasterizer's output has appeared.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// What a rasterizer should put behind the artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Leave uncovered pixels fully transparent.
    Transparent,
    /// Fill uncovered pixels with a colour.
    Solid(Colour),
}

/// Errors that can occur while rasterizing artwork.
#[derive(Debug)]
pub enum RasterizeError {
    /// The external tool could not be started at all.
    Spawn {
        /// The program that was run.
        program: String,
        /// Why it could not be started.
        source: io::Error,
    },
    /// The external tool ran but reported failure.
    ExternalTool {
        /// The program that was run.
        program: String,
        /// Its exit status.
        status: ExitStatus,
        /// Whatever it wrote to stderr.
        stderr: String,
    },
    /// The expected output never appeared.
    Timeout {
        /// Where the output was expected.
        path: PathBuf,
        /// How long we waited for it.
        waited: Duration,
    },
    /// In-process rendering failed.
    Render {
        /// The artwork being rendered.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for RasterizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterizeError::Spawn { program, source } => {
                write!(f, "could not run `{program}`: {source}")
            }
            RasterizeError::ExternalTool {
                program,
                status,
                stderr,
            } => {
                write!(f, "`{program}` failed ({status})")?;
                if !stderr.trim().is_empty() {
                    write!(f, ": {}", stderr.trim())?;
                }
                Ok(())
            }
            RasterizeError::Timeout { path, waited } => write!(
                f,
                "rasterized file was not created after {:.1} seconds, expected at {}",
                waited.as_secs_f32(),
                path.display()
            ),
            RasterizeError::Render { path, reason } => {
                write!(f, "could not render {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for RasterizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RasterizeError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Something that can render an SVG file to a PNG file of an exact pixel size.
pub trait Rasterizer {
    /// Renders `source` to a `width` x `height` PNG at `output`.
    ///
    /// # Arguments
    /// * `source`: The SVG file to render.
    /// * `output`: Where to write the PNG.
    /// * `width`: Width of the PNG in pixels.
    /// * `height`: Height of the PNG in pixels.
    /// * `background`: What to put behind the artwork.
    ///
    /// # Returns
    /// `Ok(())` once the PNG exists at `output`.
    ///
    /// # Errors
    /// A [`RasterizeError`] if the PNG could not be produced.
    fn render(
        &self,
        source: &Path,
        output: &Path,
        width: u32,
        height: u32,
        background: Background,
    ) -> Result<(), RasterizeError>;
}

/// Waits for a file to appear, checking every `interval` for at most `timeout`.
///
/// Some rasterizers hand their output to the filesystem after the process has already
/// exited, so the file existing is the only reliable completion signal.
///
/// # Arguments
/// * `path`: The file to wait for.
/// * `timeout`: How long to wait in total.
/// * `interval`: How long to sleep between checks, clamped to at least a millisecond.
///
/// # Returns
/// `Ok(())` as soon as the file exists.
///
/// # Errors
/// [`RasterizeError::Timeout`] if the file still does not exist after `timeout`.
pub fn wait_for_file(
    path: &Path,
    timeout: Duration,
    interval: Duration,
) -> Result<(), RasterizeError> {
    let interval = interval.max(Duration::from_millis(1));
    let mut waited = Duration::ZERO;

    while !path.exists() && waited < timeout {
        debug!(
            "Waiting for {}... ({:.1}s)",
            path.display(),
            waited.as_secs_f32()
        );
        thread::sleep(interval);
        waited += interval;
    }

    if path.exists() {
        debug!("Rasterized file found at {}", path.display());
        Ok(())
    } else {
        Err(RasterizeError::Timeout {
            path: path.to_path_buf(),
            waited,
        })
    }
}

/// Rasterizes by shelling out to Inkscape (or anything that takes Inkscape's export flags).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkscapeRasterizer {
    /// The program to run.
    program: String,
    /// How long to wait for the output after the program exits.
    timeout: Duration,
    /// How often to check for the output.
    poll_interval: Duration,
}

impl InkscapeRasterizer {
    /// Creates a new [`InkscapeRasterizer`].
    ///
    /// # Arguments
    /// * `program`: The program to run, looked up on `PATH` if not a path.
    /// * `timeout`: How long to wait for the output after the program exits.
    /// * `poll_interval`: How often to check for the output.
    ///
    /// # Returns
    /// The rasterizer.
    pub fn new(program: impl Into<String>, timeout: Duration, poll_interval: Duration) -> Self {
        InkscapeRasterizer {
            program: program.into(),
            timeout,
            poll_interval,
        }
    }

    /// Builds the command line arguments for one export.
    ///
    /// # Arguments
    /// * `source`: The SVG file to render.
    /// * `output`: Where to write the PNG.
    /// * `width`: Width in pixels.
    /// * `height`: Height in pixels.
    /// * `background`: What to put behind the artwork.
    ///
    /// # Returns
    /// The arguments, source last.
    pub fn arguments(
        source: &Path,
        output: &Path,
        width: u32,
        height: u32,
        background: Background,
    ) -> Vec<OsString> {
        let mut export_filename = OsString::from("--export-filename=");
        export_filename.push(output);

        let mut arguments = vec![
            export_filename,
            format!("--export-width={width}").into(),
            format!("--export-height={height}").into(),
        ];

        match background {
            Background::Transparent => {
                arguments.push("--export-background-opacity=0".into());
            }
            Background::Solid(colour) => {
                let opacity = f32::from(colour.alpha()) / f32::from(u8::MAX);
                arguments.push(format!("--export-background={}", colour.to_rgb_hex()).into());
                arguments.push(format!("--export-background-opacity={opacity}").into());
            }
        }

        arguments.push(source.into());
        arguments
    }
}

impl Default for InkscapeRasterizer {
    fn default() -> Self {
        InkscapeRasterizer::new(DEFAULT_PROGRAM, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

impl Rasterizer for InkscapeRasterizer {
    fn render(
        &self,
        source: &Path,
        output: &Path,
        width: u32,
        height: u32,
        background: Background,
    ) -> Result<(), RasterizeError> {
        let arguments = InkscapeRasterizer::arguments(source, output, width, height, background);
        info!("Running {} for {width}x{height}...", self.program);
        debug!("Command: {} {arguments:?}", self.program);

        let command_output = Command::new(&self.program)
            .args(&arguments)
            .output()
            .map_err(|source| RasterizeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&command_output.stdout);
        if !stdout.trim().is_empty() {
            debug!("{}: {}", self.program, stdout.trim());
        }

        if !command_output.status.success() {
            return Err(RasterizeError::ExternalTool {
                program: self.program.clone(),
                status: command_output.status,
                stderr: String::from_utf8_lossy(&command_output.stderr).into_owned(),
            });
        }
        debug!("{} completed", self.program);

        wait_for_file(output, self.timeout, self.poll_interval)
    }
}

/// Rasterizes in-process with resvg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResvgRasterizer;

impl Rasterizer for ResvgRasterizer {
    fn render(
        &self,
        source: &Path,
        output: &Path,
        width: u32,
        height: u32,
        background: Background,
    ) -> Result<(), RasterizeError> {
        let render_error = |reason: String| RasterizeError::Render {
            path: source.to_path_buf(),
            reason,
        };

        let bytes = std::fs::read(source).map_err(|err| render_error(err.to_string()))?;
        let tree = parse_svg(source, &bytes).map_err(|err| render_error(err.to_string()))?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| render_error(format!("cannot allocate a {width}x{height} pixmap")))?;
        if let Background::Solid(colour) = background {
            let [r, g, b, a] = colour.0;
            pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
        }

        #[allow(clippy::cast_precision_loss)]
        let transform = tiny_skia::Transform::default().pre_scale(
            width as f32 / tree.size().width(),
            height as f32 / tree.size().height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap
            .save_png(output)
            .map_err(|err| render_error(err.to_string()))?;
        info!("Rendered {width}x{height} in-process");

        Ok(())
    }
}
