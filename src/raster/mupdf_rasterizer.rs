//! MuPDF-backed rasterizer
//!
//! PDF input is rendered with MuPDF on the blocking thread pool. Raster input
//! (scans uploaded as PNG/JPEG/TIFF) is decoded and re-encoded as PNG as-is.

use async_trait::async_trait;
use image::DynamicImage;
use mupdf::{Colorspace, Document, Matrix};

use super::format::PageFormat;
use super::stats::encode_png;
use super::{RasterError, Rasterizer};

/// PDF user space units per inch
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Only the first page of a submitted document is processed
const PAGE_INDEX: i32 = 0;

#[derive(Debug, Clone, Default)]
pub struct MupdfRasterizer;

impl MupdfRasterizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Rasterizer for MupdfRasterizer {
    fn name(&self) -> &str {
        "mupdf"
    }

    async fn rasterize(&self, page_bytes: &[u8], dpi: u32) -> Result<Vec<u8>, RasterError> {
        let format = PageFormat::from_magic_bytes(page_bytes).ok_or(RasterError::UnsupportedFormat)?;
        let data = page_bytes.to_vec();

        // Offload CPU-bound rendering to the blocking thread pool
        tokio::task::spawn_blocking(move || match format {
            PageFormat::Pdf => render_pdf_page(&data, dpi),
            PageFormat::Image(fmt) => {
                let img = image::load_from_memory_with_format(&data, fmt)?;
                encode_png(img)
            }
        })
        .await
        .map_err(|e| RasterError::RenderError(format!("Task join error: {}", e)))?
    }
}

fn render_pdf_page(data: &[u8], dpi: u32) -> Result<Vec<u8>, RasterError> {
    let doc = Document::from_bytes(data, "application/pdf")
        .map_err(|e| RasterError::OpenError(e.to_string()))?;
    if doc.page_count()? <= PAGE_INDEX {
        return Err(RasterError::OpenError("Document has no pages".to_string()));
    }

    let page = doc.load_page(PAGE_INDEX)?;
    let scale = dpi as f32 / PDF_POINTS_PER_INCH;
    let matrix = Matrix::new_scale(scale, scale);
    let pixmap = page.to_pixmap(&matrix, &Colorspace::device_rgb(), false, true)?;

    encode_png(pixmap_to_image(&pixmap)?)
}

fn pixmap_to_image(pixmap: &mupdf::Pixmap) -> Result<DynamicImage, RasterError> {
    let (width, height) = (pixmap.width() as u32, pixmap.height() as u32);
    let rgb = samples_to_rgb(
        pixmap.samples(),
        pixmap.n() as usize,
        width as usize * height as usize,
    );

    image::RgbImage::from_raw(width, height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| RasterError::ImageError("Pixmap sample count does not match its size".to_string()))
}

/// Collapse samples with `n` components per pixel to packed RGB.
/// Gray pixels are widened by repeating the single channel.
fn samples_to_rgb(samples: &[u8], n: usize, pixel_count: usize) -> Vec<u8> {
    samples
        .chunks_exact(n.max(1))
        .take(pixel_count)
        .flat_map(|px| match px {
            [gray] | [gray, _] => [*gray; 3],
            [r, g, b, ..] => [*r, *g, *b],
            [] => [255; 3],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_to_rgb_layouts() {
        // RGBA drops alpha
        assert_eq!(samples_to_rgb(&[1, 2, 3, 255, 4, 5, 6, 0], 4, 2), vec![1, 2, 3, 4, 5, 6]);
        // Gray + alpha widens the gray channel
        assert_eq!(samples_to_rgb(&[9, 255], 2, 1), vec![9, 9, 9]);
        // Trailing samples beyond the pixel count are ignored
        assert_eq!(samples_to_rgb(&[1, 2, 3, 7, 7, 7], 3, 1), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_rejects_unknown_bytes() {
        let result = MupdfRasterizer::new().rasterize(b"definitely not a page", 300).await;
        assert!(matches!(result, Err(RasterError::UnsupportedFormat)));
    }

    #[tokio::test]
    async fn test_image_input_passes_through_as_png() {
        let img = image::RgbImage::from_pixel(20, 10, image::Rgb([10, 20, 30]));
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let png = MupdfRasterizer::new().rasterize(&jpeg, 300).await.unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }

    #[tokio::test]
    async fn test_truncated_pdf_fails() {
        let result = MupdfRasterizer::new().rasterize(b"%PDF-1.4\n%%EOF", 72).await;
        assert!(result.is_err());
    }
}
