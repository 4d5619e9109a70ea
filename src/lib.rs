//! Balloon Extract
//!
//! Extracts balloon callouts and the dimension annotations they reference from
//! single-page engineering drawings (PDF or scanned image), exposed over HTTP.

pub mod config;
pub mod drawing;
pub mod error;
pub mod ocr;
pub mod raster;
pub mod routes;
pub mod state;
pub mod upload;
