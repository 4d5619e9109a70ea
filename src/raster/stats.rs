//! Image statistics and placeholder pages

use std::io::Cursor;

use image::{DynamicImage, Rgb, RgbImage};

use super::RasterError;

/// Side length of the blank placeholder page, in pixels
pub const PLACEHOLDER_SIZE: u32 = 1000;

/// Mean of the per-channel (R, G, B) population standard deviation, 0-255 scale
pub fn channel_std_dev(png: &[u8]) -> Result<f64, RasterError> {
    let img = image::load_from_memory(png)?.to_rgb8();
    let pixel_count = (img.width() as u64 * img.height() as u64) as f64;
    if pixel_count == 0.0 {
        return Err(RasterError::ImageError("Image has no pixels".to_string()));
    }

    let mut sum = [0f64; 3];
    let mut sum_sq = [0f64; 3];
    for pixel in img.pixels() {
        for (channel, value) in pixel.0.iter().enumerate() {
            let v = *value as f64;
            sum[channel] += v;
            sum_sq[channel] += v * v;
        }
    }

    let total: f64 = (0..3)
        .map(|c| {
            let mean = sum[c] / pixel_count;
            (sum_sq[c] / pixel_count - mean * mean).max(0.0).sqrt()
        })
        .sum();

    Ok(total / 3.0)
}

/// Blank white PNG page
pub fn placeholder_png(width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
    let img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    encode_png(DynamicImage::ImageRgb8(img))
}

pub(super) fn encode_png(img: DynamicImage) -> Result<Vec<u8>, RasterError> {
    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_page_has_zero_deviation() {
        let png = placeholder_png(32, 32).unwrap();
        let std_dev = channel_std_dev(&png).unwrap();
        assert!(std_dev.abs() < 1e-9);
    }

    #[test]
    fn test_half_black_half_white() {
        let img = RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let png = encode_png(DynamicImage::ImageRgb8(img)).unwrap();

        let std_dev = channel_std_dev(&png).unwrap();
        assert!((std_dev - 127.5).abs() < 1e-6);
    }

    #[test]
    fn test_placeholder_dimensions() {
        let png = placeholder_png(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), PLACEHOLDER_SIZE);
        assert_eq!(img.height(), PLACEHOLDER_SIZE);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(matches!(
            channel_std_dev(b"not an image"),
            Err(RasterError::ImageError(_))
        ));
    }
}
