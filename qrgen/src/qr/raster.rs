//! SVG to PNG rasterization.
//!
//! The [`Rasterizer`] owns the parsing options shared by every render. It must be brought up
//! once with [`Rasterizer::init`] during startup, before the first request is served; `init`
//! renders a small probe image so that a broken rendering backend fails the process at boot
//! rather than on the first request.

use std::sync::Arc;

use resvg::{tiny_skia, usvg};
use tracing::{debug, instrument};

use super::GenerationError;

const PROBE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2"><rect width="1" height="1"/></svg>"#;

/// Target pixel size of the rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSize {
    /// Use the SVG's own width and height (rounded up to whole pixels)
    Original,
    /// Scale uniformly so the image is exactly this many pixels wide
    Width(u32),
}

impl OutputSize {
    pub fn label(&self) -> &'static str {
        match self {
            OutputSize::Original => "original",
            OutputSize::Width(_) => "width",
        }
    }

    /// Resolve the pixel dimensions for an SVG of the given native size.
    ///
    /// When scaling to a width the height keeps the aspect ratio and is rounded up.
    pub fn resolve(&self, native_width: f32, native_height: f32) -> Result<(u32, u32), GenerationError> {
        let (width, height) = match *self {
            OutputSize::Original => (native_width.ceil() as u32, native_height.ceil() as u32),
            OutputSize::Width(width) => {
                let height = (f64::from(width) * f64::from(native_height) / f64::from(native_width)).ceil();
                (width, height.min(f64::from(u32::MAX)) as u32)
            }
        };

        if width == 0 || height == 0 || !native_width.is_finite() || !native_height.is_finite() {
            return Err(GenerationError::InvalidSize { width, height });
        }
        Ok((width, height))
    }
}

/// Rasterizes SVG documents to PNG.
///
/// Cheap to clone; clones share the same parsing options.
#[derive(Clone)]
pub struct Rasterizer {
    options: Arc<usvg::Options<'static>>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer").finish_non_exhaustive()
    }
}

impl Rasterizer {
    /// Bring up the rendering engine and verify it can produce a PNG.
    #[instrument(err)]
    pub fn init() -> Result<Self, GenerationError> {
        let rasterizer = Self {
            options: Arc::new(usvg::Options::default()),
        };

        let probe = rasterizer.render(PROBE_SVG, OutputSize::Original)?;
        debug!(probe_bytes = probe.len(), "Rasterizer initialized");

        Ok(rasterizer)
    }

    /// Render `svg` to PNG bytes at the requested size.
    pub fn render(&self, svg: &str, size: OutputSize) -> Result<Vec<u8>, GenerationError> {
        let tree = usvg::Tree::from_str(svg, &self.options)?;
        let native = tree.size();
        let (width, height) = size.resolve(native.width(), native.height())?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(GenerationError::Allocate { width, height })?;
        let transform = tiny_skia::Transform::from_scale(width as f32 / native.width(), height as f32 / native.height());
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap.encode_png().map_err(|e| GenerationError::EncodePng(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="40"><rect width="40" height="40" fill="black"/></svg>"#;
    const WIDE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="10"><rect width="30" height="10"/></svg>"#;

    fn png_dimensions(png: &[u8]) -> (u32, u32) {
        let image = image::load_from_memory_with_format(png, image::ImageFormat::Png).expect("valid PNG");
        (image.width(), image.height())
    }

    #[test]
    fn test_init_succeeds() {
        assert!(Rasterizer::init().is_ok());
    }

    #[test]
    fn test_render_original_size() {
        let rasterizer = Rasterizer::init().unwrap();
        let png = rasterizer.render(SQUARE, OutputSize::Original).unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(png_dimensions(&png), (40, 40));
    }

    #[test]
    fn test_render_scaled_to_width_keeps_aspect_ratio() {
        let rasterizer = Rasterizer::init().unwrap();

        assert_eq!(png_dimensions(&rasterizer.render(SQUARE, OutputSize::Width(256)).unwrap()), (256, 256));
        assert_eq!(png_dimensions(&rasterizer.render(WIDE, OutputSize::Width(31)).unwrap()), (31, 11));
        assert_eq!(png_dimensions(&rasterizer.render(SQUARE, OutputSize::Width(1)).unwrap()), (1, 1));
    }

    #[test]
    fn test_render_rejects_malformed_svg() {
        let rasterizer = Rasterizer::init().unwrap();
        let err = rasterizer.render("<svg", OutputSize::Original).unwrap_err();

        assert!(matches!(err, GenerationError::ParseSvg(_)));
        assert_eq!(err.stage(), "parse");
    }

    #[test]
    fn test_resolve_sizes() {
        assert_eq!(OutputSize::Original.resolve(232.0, 232.0).unwrap(), (232, 232));
        assert_eq!(OutputSize::Original.resolve(10.2, 3.5).unwrap(), (11, 4));
        assert_eq!(OutputSize::Width(100).resolve(30.0, 10.0).unwrap(), (100, 34));
        assert!(matches!(
            OutputSize::Width(0).resolve(30.0, 10.0),
            Err(GenerationError::InvalidSize { width: 0, .. })
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let rasterizer = Rasterizer::init().unwrap();
        let first = rasterizer.render(WIDE, OutputSize::Width(97)).unwrap();
        let second = rasterizer.render(WIDE, OutputSize::Width(97)).unwrap();

        assert_eq!(first, second);
    }
}
