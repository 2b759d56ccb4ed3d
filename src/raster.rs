//! Vector-to-raster conversion

use std::sync::Arc;

use crate::error::{IconError, Result};

/// Converts final SVG markup into PNG bytes.
///
/// Implementations are called from a blocking thread and must not touch the
/// output location; the store owns all file I/O.
pub trait Rasterizer: Send + Sync {
    /// Whether the converter can run in this environment
    fn is_available(&self) -> bool {
        true
    }

    /// Render `svg` to a `size`×`size` PNG
    fn rasterize(&self, svg: &str, size: u32) -> Result<Vec<u8>>;
}

/// Stand-in used when no converter is compiled in
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRasterizer;

impl Rasterizer for UnavailableRasterizer {
    fn is_available(&self) -> bool {
        false
    }

    fn rasterize(&self, _svg: &str, _size: u32) -> Result<Vec<u8>> {
        Err(IconError::RasterUnavailable)
    }
}

/// resvg-backed rasterizer.
///
/// The SVG is drawn at its own dimensions and then resampled to the target
/// edge with a Lanczos filter.
#[cfg(feature = "raster")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ResvgRasterizer;

#[cfg(feature = "raster")]
impl ResvgRasterizer {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "raster")]
impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &str, size: u32) -> Result<Vec<u8>> {
        use std::io::Cursor;
        use image::{imageops::FilterType, DynamicImage, ImageFormat, RgbaImage};
        use resvg::{tiny_skia, usvg};

        if size == 0 {
            return Err(IconError::Render("cannot rasterize to a zero-sized image".to_string()));
        }

        let options = usvg::Options::default();
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| IconError::Render(format!("Failed to parse SVG: {}", e)))?;

        let native = tree.size().to_int_size();
        let (width, height) = (native.width(), native.height());
        log::trace!("Rasterizing {}x{} SVG to {}px", width, height, size);

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| IconError::Render(format!("Failed to allocate {}x{} pixmap", width, height)))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for pixel in pixmap.pixels() {
            let color = pixel.demultiply();
            rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }

        let img = RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| IconError::Render("Failed to create RGBA image from pixmap".to_string()))?;

        let img = if width != size || height != size {
            image::imageops::resize(&img, size, size, FilterType::Lanczos3)
        } else {
            img
        };

        let mut output = Vec::new();
        DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
        Ok(output)
    }
}

/// The best rasterizer this build provides
pub fn default_rasterizer() -> Arc<dyn Rasterizer> {
    #[cfg(feature = "raster")]
    {
        Arc::new(ResvgRasterizer::new())
    }

    #[cfg(not(feature = "raster"))]
    {
        log::warn!("Built without the `raster` feature; PNG icons are unavailable");
        Arc::new(UnavailableRasterizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable() {
        let rasterizer = UnavailableRasterizer;
        assert!(!rasterizer.is_available());
        assert!(matches!(
            rasterizer.rasterize("<svg/>", 16),
            Err(IconError::RasterUnavailable)
        ));
    }

    #[cfg(feature = "raster")]
    #[test]
    fn test_resvg_resamples_to_requested_size() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64"><rect width="64" height="64" fill="#ff0000"/></svg>"##;

        let png = ResvgRasterizer::new().rasterize(svg, 20).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();

        assert_eq!(img.dimensions(), (20, 20));
        let [r, g, b, a] = img.get_pixel(10, 10).0;
        assert!(r > 250 && g < 5 && b < 5 && a > 250, "unexpected pixel {:?}", [r, g, b, a]);
    }

    #[cfg(feature = "raster")]
    #[test]
    fn test_resvg_rejects_invalid_input() {
        let rasterizer = ResvgRasterizer::new();
        assert!(rasterizer.is_available());
        assert!(matches!(
            rasterizer.rasterize("<!-- SVG not found -->", 32),
            Err(IconError::Render(_))
        ));
        assert!(matches!(
            rasterizer.rasterize("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"4\" height=\"4\"/>", 0),
            Err(IconError::Render(_))
        ));
    }
}
