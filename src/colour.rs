//! `colour`
//!
//! Colour values as they appear in SVG documents and icon manifests.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// An RGBA colour with 8 bits per channel, not premultiplied.
///
/// Parses from any colour syntax SVG accepts (`#rgb`, `#rrggbb`, `rgb(...)`,
/// named colours like `white`) and serializes back to hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Colour(pub [u8; 4]);

impl Colour {
    /// Opaque white.
    pub const WHITE: Colour = Colour([255, 255, 255, 255]);
    /// Opaque black.
    pub const BLACK: Colour = Colour([0, 0, 0, 255]);
    /// Fully transparent black.
    pub const TRANSPARENT: Colour = Colour([0, 0, 0, 0]);

    /// Gets the colour as an `image` pixel.
    ///
    /// # Returns
    /// The RGBA pixel with the same channel values.
    pub fn to_pixel(self) -> image::Rgba<u8> {
        image::Rgba(self.0)
    }

    /// Gets the alpha channel.
    ///
    /// # Returns
    /// The alpha value, 255 is opaque.
    pub fn alpha(self) -> u8 {
        self.0[3]
    }

    /// Formats the colour channels without alpha as `#rrggbb`.
    ///
    /// # Returns
    /// The hex string, which is what external rasterizers expect for a background.
    pub fn to_rgb_hex(self) -> String {
        let [r, g, b, _] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// A colour string that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColourError {
    /// The text that failed to parse.
    pub value: String,
}

impl fmt::Display for ParseColourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid colour", self.value)
    }
}

impl std::error::Error for ParseColourError {}

impl FromStr for Colour {
    type Err = ParseColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let colour = svgtypes::Color::from_str(s.trim()).map_err(|_| ParseColourError {
            value: s.to_string(),
        })?;
        Ok(Colour([colour.red, colour.green, colour.blue, colour.alpha]))
    }
}

impl TryFrom<String> for Colour {
    type Error = ParseColourError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Colour> for String {
    fn from(colour: Colour) -> Self {
        colour.to_string()
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha() == u8::MAX {
            write!(f, "{}", self.to_rgb_hex())
        } else {
            write!(f, "{}{:02x}", self.to_rgb_hex(), self.alpha())
        }
    }
}
