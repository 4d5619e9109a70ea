//! Uploaded page validation
//!
//! Checks size and magic bytes before any rendering work is scheduled.

use thiserror::Error;

use crate::raster::PageFormat;

#[derive(Error, Debug, PartialEq)]
pub enum UploadError {
    #[error("Request body is empty")]
    Empty,

    #[error("File size {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported file type: expected a PDF, PNG, JPEG, TIFF or BMP page")]
    UnsupportedFormat,
}

/// Validate an uploaded page and report its detected format
pub fn validate_upload(bytes: &[u8], limit: usize) -> Result<PageFormat, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > limit {
        return Err(UploadError::TooLarge {
            size: bytes.len(),
            limit,
        });
    }
    PageFormat::from_magic_bytes(bytes).ok_or(UploadError::UnsupportedFormat)
}
