//! End-to-end icon generation against a fake rasterizer and resvg.

use std::{
    cell::Cell,
    path::{Path, PathBuf},
};

use iconographer::{
    generate_icons,
    manifest::{IconSpec, Manifest, RasterizerConfig},
    Background, Colour, IconError, RasterizeError, Rasterizer,
};
use image::RgbaImage;

const LOGO: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
    <defs>
        <linearGradient id="accent"><stop offset="0" stop-color="#112233"/></linearGradient>
        <linearGradient id="mask-background"><stop offset="0" stop-color="white"/></linearGradient>
    </defs>
    <circle cx="50" cy="50" r="40" fill="url(#accent)"/>
</svg>"##;

const INVERSE_LOGO: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
    <defs>
        <linearGradient id="accent"><stop offset="0" stop-color="#ffffff"/></linearGradient>
        <linearGradient id="mask-background"><stop offset="0" stop-color="#000000"/></linearGradient>
    </defs>
    <rect width="100" height="100" fill="#445566"/>
</svg>"##;

/// Writes an opaque grey square immediately and counts calls.
#[derive(Default)]
struct FakeRasterizer {
    /// How many renders were requested.
    calls: Cell<usize>,
}

impl Rasterizer for FakeRasterizer {
    fn render(
        &self,
        _source: &Path,
        output: &Path,
        width: u32,
        height: u32,
        _background: Background,
    ) -> Result<(), RasterizeError> {
        self.calls.set(self.calls.get() + 1);
        RgbaImage::from_pixel(width, height, image::Rgba([90, 90, 90, 255]))
            .save(output)
            .map_err(|err| RasterizeError::Render {
                path: output.to_path_buf(),
                reason: err.to_string(),
            })
    }
}

/// Never produces anything.
struct TimingOutRasterizer;

impl Rasterizer for TimingOutRasterizer {
    fn render(
        &self,
        _source: &Path,
        output: &Path,
        _width: u32,
        _height: u32,
        _background: Background,
    ) -> Result<(), RasterizeError> {
        Err(RasterizeError::Timeout {
            path: output.to_path_buf(),
            waited: std::time::Duration::from_secs(10),
        })
    }
}

fn project(dir: &Path) -> Manifest {
    let assets = dir.join("assets");
    std::fs::create_dir_all(&assets).unwrap();
    std::fs::write(assets.join("logo.svg"), LOGO).unwrap();
    std::fs::write(assets.join("logo-inverse.svg"), INVERSE_LOGO).unwrap();
    Manifest::default().resolved_against(dir)
}

fn open(path: &Path) -> RgbaImage {
    image::open(path).unwrap().into_rgba8()
}

#[test]
fn default_icons() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = project(dir.path());
    let rasterizer = FakeRasterizer::default();

    let written = generate_icons(&manifest, &rasterizer).unwrap();

    let names: Vec<PathBuf> = written
        .iter()
        .map(|path| path.strip_prefix(dir.path().join("assets")).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        names,
        [
            "play-store-icon-512x512.png",
            "icon-with-border-512.png",
            "icon-with-border-1024.png",
            "icon-with-border-inverse-1024.png",
            "icon-grayscale-1024.png",
            "splash-icon-1024.png",
        ]
        .map(PathBuf::from)
    );
    assert_eq!(rasterizer.calls.get(), 6, "one render per icon");

    let accent = Colour([0x11, 0x22, 0x33, 255]).to_pixel();
    let grey = image::Rgba([90, 90, 90, 255]);

    let bordered = open(&written[1]);
    assert_eq!(bordered.dimensions(), (512, 512));
    assert_eq!(*bordered.get_pixel(0, 0), accent, "border ring");
    assert_eq!(*bordered.get_pixel(63, 63), accent, "border ring");
    assert_eq!(*bordered.get_pixel(64, 64), grey, "artwork");
    assert_eq!(*bordered.get_pixel(447, 447), grey, "artwork");
    assert_eq!(*bordered.get_pixel(448, 448), accent, "border ring");

    let inverse = open(&written[3]);
    assert_eq!(inverse.dimensions(), (1024, 1024));
    assert_eq!(inverse.get_pixel(0, 0).0[3], 0, "black mask gets no border");

    let grayscale = open(&written[4]);
    let corner = grayscale.get_pixel(0, 0).0;
    assert_eq!(corner[3], 255, "grayscale border stays opaque");
    assert!(
        corner[0] == corner[1] && corner[1] == corner[2],
        "grayscale border is gray, got {corner:?}"
    );

    let splash = open(&written[5]);
    assert_eq!(splash.dimensions(), (1024, 1024));
    assert_eq!(*splash.get_pixel(0, 0), grey, "splash is the artwork alone");
}

#[test]
fn missing_source_aborts_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let mut manifest = project(dir.path());
    manifest
        .icons
        .push(IconSpec::new("extra.png", dir.path().join("nope.svg"), 64, 4));
    let rasterizer = FakeRasterizer::default();

    let err = generate_icons(&manifest, &rasterizer).unwrap_err();

    match err {
        IconError::MissingSourceFile { path } => assert_eq!(path, dir.path().join("nope.svg")),
        other => panic!("expected a missing source file, got {other:?}"),
    }
    assert_eq!(rasterizer.calls.get(), 0, "nothing was rendered");
    assert!(
        !manifest.output_path(&manifest.icons[0]).exists(),
        "nothing was written"
    );
}

#[test]
fn rasterizer_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = project(dir.path());

    let err = generate_icons(&manifest, &TimingOutRasterizer).unwrap_err();

    assert!(
        matches!(err, IconError::Rasterize(RasterizeError::Timeout { .. })),
        "expected a timeout, got {err:?}"
    );
    assert!(
        err.to_string().contains("render-384x384.png"),
        "the message names the expected file: {err}"
    );
    for icon in &manifest.icons {
        assert!(
            !manifest.output_path(icon).exists(),
            "{} should not exist",
            icon.output.display()
        );
    }
}

#[test]
fn resvg_backend() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("logo.svg"), LOGO).unwrap();
    let manifest: Manifest = serde_json::from_str::<Manifest>(
        r#"{
            "output_dir": "out",
            "rasterizer": { "backend": "resvg" },
            "icons": [
                { "output": "icon.png", "source": "logo.svg", "size": 64, "border_width": 8 },
                { "output": "store.png", "source": "logo.svg", "size": 64, "border_width": 8, "background": "black" }
            ]
        }"#,
    )
    .unwrap()
    .resolved_against(dir.path());
    assert_eq!(manifest.rasterizer, RasterizerConfig::Resvg);

    let rasterizer = manifest.rasterizer.build();
    let written = generate_icons(&manifest, rasterizer.as_ref()).unwrap();

    let accent = Colour([0x11, 0x22, 0x33, 255]).to_pixel();
    let icon = open(&written[0]);
    assert_eq!(icon.dimensions(), (64, 64));
    assert_eq!(*icon.get_pixel(0, 0), accent, "border ring");
    assert_eq!(*icon.get_pixel(32, 32), accent, "circle filled with the accent gradient");
    assert_eq!(icon.get_pixel(9, 9).0[3], 0, "transparent corner of the artwork");

    let store = open(&written[1]);
    assert_eq!(
        *store.get_pixel(9, 9),
        Colour::BLACK.to_pixel(),
        "background shows through the artwork's transparent corner"
    );
}
