//! Drawing extraction types
//!
//! Tokens, balloons, dimensions and the final per-page result.

use serde::{Deserialize, Serialize};

/// A point in page-pixel coordinates (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One recognized text fragment with its bounding box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToken {
    /// Trimmed, non-empty text
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Derived from box height when not known
    pub font_size: f64,
    /// Degrees; always 0 for OCR-sourced tokens
    pub rotation: f64,
}

impl TextToken {
    /// Build a token from OCR output. Returns `None` when the trimmed text is empty.
    pub fn new(text: &str, x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            x,
            y,
            width,
            height,
            font_size: height,
            rotation: 0.0,
        })
    }

    /// Top-left corner of the bounding box
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Center of the bounding box
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Where the page's tokens came from, as decided by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    /// Page classified as vector-originated
    Vector,
    /// Page classified as a scan; OCR uncertainty applies
    Scanned,
}

impl TokenSource {
    pub fn from_vector_flag(is_vector_based: bool) -> Self {
        if is_vector_based {
            Self::Vector
        } else {
            Self::Scanned
        }
    }
}

/// Balloon shape inferred from the source marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalloonShape {
    Circle,
}

/// A detected reference-number marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalloonCandidate {
    /// Derived from number and position, unique within a run
    pub id: String,
    /// 1..=99
    pub number: u8,
    pub center: Point,
    pub radius: f64,
    pub confidence: f64,
    pub source_type: BalloonShape,
}

/// Kind of measurement a dimension callout expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionType {
    Linear,
    Radial,
    Diameter,
    Angular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToleranceKind {
    Bilateral,
    Unilateral,
}

/// Tolerance band; bounds are kept as text to preserve formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tolerance {
    pub upper: String,
    pub lower: String,
    pub kind: ToleranceKind,
}

/// A parsed measurement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRecord {
    /// Numeric value as printed
    pub value: String,
    pub unit: String,
    #[serde(rename = "type")]
    pub dimension_type: DimensionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<Tolerance>,
    /// Reserved for GD&T symbology; never populated by the grammar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gdt_symbol: Option<String>,
}

/// A balloon paired with its nearest dimension callout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionMatch {
    pub balloon_id: String,
    pub balloon_number: u8,
    pub dimension: DimensionRecord,
    /// Origin of the matched token, not the balloon
    pub position: Point,
    pub confidence: f64,
}

/// Output of one pipeline run over a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub is_vector_based: bool,
    pub page_count: u32,
    pub dimensions: Vec<DimensionMatch>,
    pub balloons: Vec<BalloonCandidate>,
    pub text_items: Vec<TextToken>,
    pub processing_time_ms: u64,
    pub errors: Vec<String>,
}

impl ProcessingResult {
    /// Result for a run that could not read the page
    pub fn failed(errors: Vec<String>, processing_time_ms: u64) -> Self {
        Self {
            is_vector_based: false,
            page_count: 1,
            dimensions: Vec::new(),
            balloons: Vec::new(),
            text_items: Vec::new(),
            processing_time_ms,
            errors,
        }
    }

    /// True when the page could not be read, as opposed to a page without balloons.
    pub fn is_unreadable(&self) -> bool {
        self.dimensions.is_empty() && !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_trims_and_rejects_empty() {
        let token = TextToken::new("  12 ", 10.0, 20.0, 8.0, 14.0).unwrap();
        assert_eq!(token.text, "12");
        assert_eq!(token.font_size, 14.0);
        assert_eq!(token.rotation, 0.0);

        assert!(TextToken::new("   ", 0.0, 0.0, 1.0, 1.0).is_none());
    }

    #[test]
    fn test_token_center() {
        let token = TextToken::new("25mm", 40.0, 45.0, 20.0, 10.0).unwrap();
        assert_eq!(token.center(), Point::new(50.0, 50.0));
        assert_eq!(token.origin(), Point::new(40.0, 45.0));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ProcessingResult::failed(vec!["boom".to_string()], 3);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["isVectorBased"], false);
        assert_eq!(json["processingTimeMs"], 3);
        assert!(json["textItems"].as_array().unwrap().is_empty());
        assert!(result.is_unreadable());
    }

    #[test]
    fn test_dimension_record_type_field() {
        let record = DimensionRecord {
            value: "5".to_string(),
            unit: "mm".to_string(),
            dimension_type: DimensionType::Radial,
            tolerance: None,
            gdt_symbol: None,
        };
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "radial");
        assert!(json.get("tolerance").is_none());
    }
}
