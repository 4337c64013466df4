//! `compose`
//!
//! Builds finished icons: a square canvas with an optional border ring in the artwork's
//! accent colour, an optional solid background, and the rasterized artwork in the middle.

use std::path::Path;

use image::{imageops, DynamicImage, RgbaImage};
use log::{debug, warn};

use crate::{
    colour::Colour,
    manifest::IconSpec,
    rasterize::{Background, Rasterizer},
    svg::{read_colour_pair, ColourPair},
    IconError,
};

/// Decides the border colour for some artwork.
///
/// Only artwork whose mask expects a white surround gets a border, and then the border is
/// the accent colour. Anything else, including a missing mask background, gets no border.
///
/// # Arguments
/// * `colours`: The colours extracted from the artwork.
///
/// # Returns
/// The border colour, if there should be a border.
///
/// # Errors
/// [`IconError::InvalidColour`] if a border is wanted but the accent is not a colour.
pub fn border_colour(colours: &ColourPair) -> Result<Option<Colour>, IconError> {
    let wants_border = colours
        .mask_background
        .as_deref()
        .is_some_and(|mask| mask.trim().eq_ignore_ascii_case("white"));
    if !wants_border {
        return Ok(None);
    }

    let Some(accent) = colours.accent.as_deref() else {
        warn!("Mask background is white but there is no accent colour, drawing no border");
        return Ok(None);
    };

    let Colour([r, g, b, _]) = accent.parse::<Colour>().map_err(|_| IconError::InvalidColour {
        value: accent.to_string(),
    })?;

    // The ring is always opaque, whatever alpha the accent carries.
    Ok(Some(Colour([r, g, b, u8::MAX])))
}

/// Creates a `size` x `size` canvas filled with `colour` except for a fully transparent
/// square hole of `size - 2 * border_width` pixels at (`border_width`, `border_width`).
///
/// # Arguments
/// * `size`: Side length of the canvas.
/// * `border_width`: Width of the ring around the hole.
/// * `colour`: Colour of the ring.
///
/// # Returns
/// The canvas.
pub fn bordered_canvas(size: u32, border_width: u32, colour: Colour) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(size, size, colour.to_pixel());
    let hole_end = size.saturating_sub(border_width);

    for y in border_width..hole_end {
        for x in border_width..hole_end {
            canvas.put_pixel(x, y, Colour::TRANSPARENT.to_pixel());
        }
    }

    canvas
}

/// Converts an image to grayscale, leaving its alpha channel untouched.
///
/// # Arguments
/// * `image`: The image to convert.
///
/// # Returns
/// An RGBA image whose colour channels all hold the luminance.
pub fn to_grayscale(image: &RgbaImage) -> RgbaImage {
    DynamicImage::ImageLumaA8(imageops::grayscale_alpha(image)).to_rgba8()
}

/// Lays out a finished icon from already-rendered artwork.
///
/// # Arguments
/// * `center`: The artwork, rendered at `size - 2 * border_width` pixels square.
/// * `size`: Side length of the finished icon.
/// * `border_width`: Width of the border ring.
/// * `border`: Colour of the border ring, `None` for no ring.
/// * `background`: Colour behind everything, `None` for transparent.
/// * `grayscale`: Whether to convert the finished icon to grayscale.
///
/// # Returns
/// The finished icon, `size` x `size`.
pub fn composite(
    center: &RgbaImage,
    size: u32,
    border_width: u32,
    border: Option<Colour>,
    background: Option<Colour>,
    grayscale: bool,
) -> RgbaImage {
    let mut canvas = match border {
        Some(colour) => bordered_canvas(size, border_width, colour),
        None => RgbaImage::from_pixel(size, size, Colour::TRANSPARENT.to_pixel()),
    };

    if let Some(colour) = background {
        let mut base = RgbaImage::from_pixel(size, size, colour.to_pixel());
        imageops::overlay(&mut base, &canvas, 0, 0);
        canvas = base;
    }

    let offset = i64::from(border_width);
    imageops::overlay(&mut canvas, center, offset, offset);

    if grayscale {
        canvas = to_grayscale(&canvas);
    }

    canvas
}

/// Generates one icon as described by `spec`.
///
/// The artwork is rendered through `rasterizer` into a scoped temporary directory which
/// is removed before returning, whether or not generation succeeded.
///
/// # Arguments
/// * `spec`: The icon to generate.
/// * `rasterizer`: What renders the artwork.
///
/// # Returns
/// The finished icon, `spec.size` x `spec.size`. Nothing is written to `spec.output`.
///
/// # Errors
/// Any [`IconError`] from reading the artwork, rendering it, or loading the render.
pub fn compose_bordered_icon(
    spec: &IconSpec,
    rasterizer: &dyn Rasterizer,
) -> Result<RgbaImage, IconError> {
    let center_size = spec.center_size()?;

    let markup = std::fs::read(&spec.source).map_err(|source| IconError::Io {
        path: spec.source.clone(),
        source,
    })?;
    let colours = read_colour_pair(&markup).map_err(|source| IconError::Parse {
        path: spec.source.clone(),
        source,
    })?;
    let border = border_colour(&colours)?;
    debug!(
        "{}: accent {:?}, mask background {:?}, border {:?}",
        spec.source.display(),
        colours.accent,
        colours.mask_background,
        border
    );

    let temp_dir = tempfile::Builder::new()
        .prefix("iconographer-")
        .tempdir()
        .map_err(|source| IconError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
    let render_path = temp_dir
        .path()
        .join(format!("render-{center_size}x{center_size}.png"));

    rasterizer.render(
        &spec.source,
        &render_path,
        center_size,
        center_size,
        Background::Transparent,
    )?;
    let center = load_center(&render_path, center_size)?;

    let icon = composite(
        &center,
        spec.size,
        spec.border_width,
        border,
        spec.background,
        spec.grayscale,
    );

    let temp_path = temp_dir.path().to_path_buf();
    if let Err(err) = temp_dir.close() {
        warn!(
            "Could not remove temporary directory {}: {err}",
            temp_path.display()
        );
    }

    Ok(icon)
}

/// Loads a rendered centre, resizing it if the rasterizer did not honour the size.
///
/// # Arguments
/// * `path`: The rendered PNG.
/// * `center_size`: The side length it should have.
///
/// # Returns
/// The centre image, exactly `center_size` square.
///
/// # Errors
/// [`IconError::Image`] if the file cannot be decoded.
fn load_center(path: &Path, center_size: u32) -> Result<RgbaImage, IconError> {
    let center = image::open(path)
        .map_err(|source| IconError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgba8();

    if center.dimensions() == (center_size, center_size) {
        return Ok(center);
    }

    let (width, height) = center.dimensions();
    warn!("Rasterizer produced {width}x{height} instead of {center_size}x{center_size}, resizing");
    Ok(imageops::resize(
        &center,
        center_size,
        center_size,
        imageops::FilterType::Lanczos3,
    ))
}
