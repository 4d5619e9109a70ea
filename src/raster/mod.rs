//! Page Rasterization
//!
//! Turns a single submitted page into PNG bytes for classification and OCR.
//!
//! - `MupdfRasterizer`: renders PDF page 0 with MuPDF, passes raster uploads through
//! - `placeholder_png`: blank page used when rasterization fails
//! - `channel_std_dev`: cheap contrast statistic for the page classifier

mod format;
mod mupdf_rasterizer;
mod stats;

use async_trait::async_trait;

pub use format::PageFormat;
pub use mupdf_rasterizer::MupdfRasterizer;
pub use stats::{channel_std_dev, placeholder_png, PLACEHOLDER_SIZE};

/// Raster error types
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Unsupported page format")]
    UnsupportedFormat,

    #[error("Failed to open page: {0}")]
    OpenError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Rasterization timed out after {0} seconds")]
    Timeout(u64),
}

impl From<mupdf::Error> for RasterError {
    fn from(err: mupdf::Error) -> Self {
        RasterError::RenderError(err.to_string())
    }
}

impl From<image::ImageError> for RasterError {
    fn from(err: image::ImageError) -> Self {
        RasterError::ImageError(err.to_string())
    }
}

/// Rasterization collaborator
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Identifier reported in response metadata
    fn name(&self) -> &str;

    /// Render the page at `dpi` and return PNG bytes
    async fn rasterize(&self, page_bytes: &[u8], dpi: u32) -> Result<Vec<u8>, RasterError>;
}
