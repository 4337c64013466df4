//!`svg`
//!
//! Provides utilities for handling SVG data.
use std::{collections::HashMap, fmt, path::Path, sync::Arc};

use resvg::usvg::{self, ImageRendering, ShapeRendering, TextRendering};

/// Id of the gradient whose first stop is the artwork's accent colour.
pub const ACCENT_GRADIENT_ID: &str = "accent";

/// Id of the gradient whose first stop is the colour the artwork's mask expects behind it.
pub const MASK_BACKGROUND_GRADIENT_ID: &str = "mask-background";

/// Namespace of the legacy `xlink:href` attribute.
const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// The two colours an icon's border policy is derived from.
///
/// These are kept exactly as written in the document, e.g. `white` or `#112233`,
/// so that callers can match on the spelling used by the artist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColourPair {
    /// First stop colour of the `accent` gradient, if there is one.
    pub accent: Option<String>,
    /// First stop colour of the `mask-background` gradient, if there is one.
    pub mask_background: Option<String>,
}

/// Errors that can occur when reading colours out of an SVG file.
#[derive(Debug)]
pub enum SvgError {
    /// The file is not UTF-8 text.
    Encoding(std::str::Utf8Error),
    /// The file is not well-formed markup.
    Markup(roxmltree::Error),
}

impl fmt::Display for SvgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgError::Encoding(err) => write!(f, "not UTF-8 text: {err}"),
            SvgError::Markup(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SvgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SvgError::Encoding(err) => Some(err),
            SvgError::Markup(err) => Some(err),
        }
    }
}

/// Reads the `accent` and `mask-background` gradient colours from the bytes of an SVG file.
///
/// # Arguments
/// * `bytes`: The contents of the file.
///
/// # Returns
/// The colour pair, see [`extract_colour_pair`].
///
/// # Errors
/// [`SvgError::Encoding`] if the bytes are not UTF-8, [`SvgError::Markup`] if they are not
/// well-formed markup.
pub fn read_colour_pair(bytes: &[u8]) -> Result<ColourPair, SvgError> {
    let text = std::str::from_utf8(bytes).map_err(SvgError::Encoding)?;
    extract_colour_pair(text).map_err(SvgError::Markup)
}

/// Reads the `accent` and `mask-background` gradient colours from an SVG document.
///
/// Only `linearGradient` elements are considered. A gradient without stops of its own
/// inherits the stops of the gradient it links to through `href`. Documents with a
/// `DOCTYPE` are accepted, as editors commonly write one.
///
/// # Arguments
/// * `text`: The SVG markup.
///
/// # Returns
/// The colour pair. Missing gradients or stops are `None`, not errors.
///
/// # Errors
/// The roxmltree error if `text` is not well-formed markup.
pub fn extract_colour_pair(text: &str) -> Result<ColourPair, roxmltree::Error> {
    let document = roxmltree::Document::parse_with_options(
        text,
        roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        },
    )?;

    // Later definitions replace earlier ones with the same id.
    let gradients: HashMap<&str, roxmltree::Node<'_, '_>> = document
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "linearGradient")
        .filter_map(|node| node.attribute("id").map(|id| (id, node)))
        .collect();

    let lookup = |id: &'static str| {
        let gradient = gradients.get(id)?;
        first_stop_colour(*gradient, &gradients, &mut vec![id])
    };

    Ok(ColourPair {
        accent: lookup(ACCENT_GRADIENT_ID),
        mask_background: lookup(MASK_BACKGROUND_GRADIENT_ID),
    })
}

/// Finds the colour of the first stop of a gradient, following `href` links.
/// Be warned, here be recursion.
///
/// # Arguments
/// * `gradient`: The gradient element.
/// * `gradients`: All gradients in the document, by id.
/// * `visited`: Ids already followed, so that link cycles end.
///
/// # Returns
/// The stop colour if one could be found.
fn first_stop_colour<'a, 'input>(
    gradient: roxmltree::Node<'a, 'input>,
    gradients: &HashMap<&'a str, roxmltree::Node<'a, 'input>>,
    visited: &mut Vec<&'a str>,
) -> Option<String> {
    if let Some(stop) = gradient
        .children()
        .find(|child| child.is_element() && child.tag_name().name() == "stop")
    {
        return stop_colour(stop);
    }

    let href = gradient
        .attribute((XLINK_NAMESPACE, "href"))
        .or_else(|| gradient.attribute("href"))?;
    let target = href.trim().strip_prefix('#')?;
    if visited.contains(&target) {
        return None;
    }
    visited.push(target);

    let linked = gradients.get(target)?;
    first_stop_colour(*linked, gradients, visited)
}

/// Reads the colour of a single `stop` element.
///
/// The `stop-color` attribute wins over a `stop-color` declaration in `style`.
///
/// # Arguments
/// * `stop`: The stop element.
///
/// # Returns
/// The colour as written, trimmed of whitespace.
fn stop_colour(stop: roxmltree::Node<'_, '_>) -> Option<String> {
    if let Some(colour) = stop.attribute("stop-color") {
        return Some(colour.trim().to_string());
    }

    stop.attribute("style")?.split(';').find_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        (property.trim() == "stop-color").then(|| value.trim().to_string())
    })
}

/// Parses an SVG file into a render tree.
///
/// # Arguments
/// * `path`: The path to the file, will be used to allow the SVG to link to files in the same
///   directory, for example it will be used if the SVG embeds an image via a link.
/// * `bytes`: The bytes of the file.
///
/// # Returns
/// The parsed SVG if it was successfully parsed, otherwise an error.
///
/// # Errors
/// Parsing errors if a tree cannot be parsed from the provided `bytes`.
pub fn parse_svg(path: &Path, bytes: &[u8]) -> Result<usvg::Tree, usvg::Error> {
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();

    fontdb.set_serif_family("Times New Roman");
    fontdb.set_sans_serif_family("Arial");
    fontdb.set_monospace_family("Courier New");

    let resources_dir = path.parent().map(std::path::Path::to_path_buf);

    let re_opt = usvg::Options {
        resources_dir,
        dpi: 96.0,
        languages: vec!["en-GB".to_string()],
        shape_rendering: ShapeRendering::GeometricPrecision,
        text_rendering: TextRendering::OptimizeLegibility,
        image_rendering: ImageRendering::OptimizeQuality,
        fontdb: Arc::new(fontdb),
        ..usvg::Options::default()
    };

    usvg::Tree::from_data(bytes, &re_opt)
}
