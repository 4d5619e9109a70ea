//! Balloon and dimension extraction
//!
//! The spatial-reasoning core: given one drawing page, find the balloon
//! callouts and pair each with the dimension text it points at.
//!
//! # Stages
//!
//! 1. [`PageClassifier`]: vector-sourced vs. scanned page
//! 2. [`TokenAcquirer`]: rasterize + OCR, with timeouts and placeholder fallback
//! 3. [`BalloonDetector`]: isolated 1-99 numerals
//! 4. [`DimensionParser`]: ordered grammar for linear/radial/diameter/angular callouts
//! 5. [`Correlator`]: nearest dimension per balloon within a fixed radius
//!
//! [`Pipeline`] sequences the stages and always returns a [`ProcessingResult`].

pub mod acquirer;
pub mod balloon;
pub mod classifier;
pub mod correlate;
pub mod dimension;
pub mod error;
pub mod pipeline;
pub mod types;

pub use acquirer::TokenAcquirer;
pub use balloon::BalloonDetector;
pub use classifier::{Classification, PageClassifier};
pub use correlate::Correlator;
pub use dimension::DimensionParser;
pub use error::AcquisitionError;
pub use pipeline::{Pipeline, PipelineConfig, PipelineStage};
pub use types::{
    BalloonCandidate, BalloonShape, DimensionMatch, DimensionRecord, DimensionType, Point,
    ProcessingResult, TextToken, Tolerance, ToleranceKind, TokenSource,
};
