//! Token acquisition errors
//!
//! Acquisition is the only stage of the pipeline that can fail a run.

use thiserror::Error;

use crate::raster::RasterError;

#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Rasterization failed; recovered with a placeholder page
    #[error("Rasterization failed: {0}")]
    Rasterization(#[from] RasterError),

    /// Every OCR attempt failed
    #[error("Text recognition failed after {attempts} attempt(s): {reason}")]
    Recognition { attempts: u32, reason: String },

    /// A collaborator call exceeded its time budget
    #[error("{stage} timed out after {secs} seconds")]
    Timeout { stage: &'static str, secs: u64 },

    /// OCR found nothing on the placeholder page, so the page could not be read
    #[error("Text recognition returned no tokens for an unreadable page")]
    EmptyRecognitionResult,
}
