//! Page format detection

/// Format of a submitted page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    Pdf,
    /// Already a raster image (a scan or a pre-rendered page)
    Image(image::ImageFormat),
}

impl PageFormat {
    /// Detect format from magic bytes
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PDF magic: %PDF
        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }

        match image::guess_format(bytes) {
            Ok(
                fmt @ (image::ImageFormat::Png
                | image::ImageFormat::Jpeg
                | image::ImageFormat::Tiff
                | image::ImageFormat::Bmp),
            ) => Some(Self::Image(fmt)),
            _ => None,
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_pdf() {
        assert_eq!(
            PageFormat::from_magic_bytes(b"%PDF-1.7\n..."),
            Some(PageFormat::Pdf)
        );
    }

    #[test]
    fn test_detects_png() {
        let png = crate::raster::placeholder_png(4, 4).unwrap();
        assert_eq!(
            PageFormat::from_magic_bytes(&png),
            Some(PageFormat::Image(image::ImageFormat::Png))
        );
    }

    #[test]
    fn test_rejects_unknown() {
        assert_eq!(PageFormat::from_magic_bytes(b"ISO-10303-21;"), None);
        assert_eq!(PageFormat::from_magic_bytes(b"%P"), None);
    }
}
