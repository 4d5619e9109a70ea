//! Vector vs. scanned page classification
//!
//! Vector renders tend to have sharper, higher-contrast edges than noisy
//! scans. The mean per-channel standard deviation of pixel intensities is used
//! as a cheap stand-in for edge detection. Threshold and polarity come from
//! configuration and still need calibrating against labelled drawings.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use super::pipeline::PipelineConfig;
use crate::raster::{channel_std_dev, RasterError, Rasterizer};

/// Outcome of classifying one page
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub is_vector_based: bool,
    /// Contrast statistic, absent when the page could not be rendered
    pub std_dev: Option<f64>,
    /// Why classification fell back to scanned mode
    pub warning: Option<String>,
}

impl Classification {
    fn uncertain(reason: String) -> Self {
        Self {
            is_vector_based: false,
            std_dev: None,
            warning: Some(format!("Page classification uncertain, assuming scanned: {}", reason)),
        }
    }
}

pub struct PageClassifier {
    rasterizer: Arc<dyn Rasterizer>,
    dpi: u32,
    threshold: f64,
    vector_when_above: bool,
    raster_timeout: Duration,
}

impl PageClassifier {
    pub fn new(config: &PipelineConfig, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            rasterizer,
            dpi: config.classify_dpi,
            threshold: config.vector_std_dev_threshold,
            vector_when_above: config.vector_when_above,
            raster_timeout: config.raster_timeout,
        }
    }

    /// Classify the page. Never fails: any rendering problem yields a scanned
    /// verdict with a warning.
    pub async fn classify(&self, page_bytes: &[u8]) -> Classification {
        let image = match timeout(self.raster_timeout, self.rasterizer.rasterize(page_bytes, self.dpi)).await {
            Ok(Ok(image)) => image,
            Ok(Err(e)) => return Classification::uncertain(e.to_string()),
            Err(_) => {
                return Classification::uncertain(
                    RasterError::Timeout(self.raster_timeout.as_secs()).to_string(),
                )
            }
        };

        match channel_std_dev(&image) {
            Ok(std_dev) => {
                let is_vector_based = self.is_vector(std_dev);
                tracing::debug!(
                    "Page std dev {:.2} (threshold {}), vector: {}",
                    std_dev,
                    self.threshold,
                    is_vector_based
                );
                Classification {
                    is_vector_based,
                    std_dev: Some(std_dev),
                    warning: None,
                }
            }
            Err(e) => Classification::uncertain(e.to_string()),
        }
    }

    /// Apply threshold and polarity to the statistic
    pub fn is_vector(&self, std_dev: f64) -> bool {
        if self.vector_when_above {
            std_dev > self.threshold
        } else {
            std_dev < self.threshold
        }
    }
}
