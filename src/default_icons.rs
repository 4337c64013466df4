//! The icons generated when no manifest is given.
use crate::{colour::Colour, manifest::IconSpec};

/// Where the default icons are written.
pub const DEFAULT_OUTPUT_DIR: &str = "assets";

/// The logo most icons are made from.
pub const DEFAULT_SOURCE: &str = "assets/logo.svg";

/// The logo for use on dark surfaces.
pub const DEFAULT_INVERSE_SOURCE: &str = "assets/logo-inverse.svg";

/// Gets the default icon table.
///
/// # Returns
/// The Play Store icon, the bordered icons, the inverse and grayscale variants, and the
/// splash icon.
pub fn default_icons() -> Vec<IconSpec> {
    [
        IconSpec::new("play-store-icon-512x512.png", DEFAULT_SOURCE, 512, 64)
            .with_background(Colour::WHITE),
        IconSpec::new("icon-with-border-512.png", DEFAULT_SOURCE, 512, 64),
        IconSpec::new("icon-with-border-1024.png", DEFAULT_SOURCE, 1024, 128),
        IconSpec::new(
            "icon-with-border-inverse-1024.png",
            DEFAULT_INVERSE_SOURCE,
            1024,
            128,
        ),
        IconSpec::new("icon-grayscale-1024.png", DEFAULT_SOURCE, 1024, 128).in_grayscale(),
        IconSpec::new("splash-icon-1024.png", DEFAULT_SOURCE, 1024, 0),
    ]
    .to_vec()
}
