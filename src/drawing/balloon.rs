//! Balloon detection
//!
//! A balloon is a free-standing 1-2 digit number. A numeral with another token
//! close by on both axes is treated as part of a larger string (e.g. the "12"
//! in "12.5mm") and rejected.

use std::sync::LazyLock;

use regex::Regex;

use super::pipeline::PipelineConfig;
use super::types::{BalloonCandidate, BalloonShape, TextToken, TokenSource};

/// Confidence assigned to every isolated numeral before derating
pub const BASE_BALLOON_CONFIDENCE: f64 = 0.85;

/// Added to half the larger box side to approximate the circle radius
pub const BALLOON_RADIUS_PAD: f64 = 5.0;

static RE_BALLOON_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,2}$").unwrap());

/// Finds isolated numerals and turns them into balloon candidates
#[derive(Debug, Clone)]
pub struct BalloonDetector {
    isolation_px: f64,
    ocr_confidence_derate: f64,
}

impl BalloonDetector {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            isolation_px: config.isolation_px,
            ocr_confidence_derate: config.ocr_confidence_derate,
        }
    }

    /// Detect balloons, sorted ascending by number. Duplicate numbers at
    /// different positions are kept as separate candidates.
    pub fn detect(&self, tokens: &[TextToken], source: TokenSource) -> Vec<BalloonCandidate> {
        let confidence = match source {
            TokenSource::Vector => BASE_BALLOON_CONFIDENCE,
            TokenSource::Scanned => BASE_BALLOON_CONFIDENCE * self.ocr_confidence_derate,
        }
        .clamp(0.0, 1.0);

        let mut balloons: Vec<BalloonCandidate> = tokens
            .iter()
            .enumerate()
            .filter_map(|(index, token)| {
                let number = balloon_number(&token.text)?;
                if !self.is_isolated(index, tokens) {
                    return None;
                }
                Some(candidate(number, index, token, confidence))
            })
            .collect();

        balloons.sort_by_key(|b| b.number);

        tracing::debug!(
            "Detected {} balloons from {} tokens ({:?})",
            balloons.len(),
            tokens.len(),
            source
        );
        balloons
    }

    /// No other token within the isolation box on both axes
    fn is_isolated(&self, index: usize, tokens: &[TextToken]) -> bool {
        let token = &tokens[index];
        !tokens.iter().enumerate().any(|(other_index, other)| {
            other_index != index
                && (other.x - token.x).abs() < self.isolation_px
                && (other.y - token.y).abs() < self.isolation_px
        })
    }
}

/// Parse a bare positive 1-2 digit integer
fn balloon_number(text: &str) -> Option<u8> {
    let text = text.trim();
    if !RE_BALLOON_NUMBER.is_match(text) {
        return None;
    }
    text.parse::<u8>().ok().filter(|n| (1..=99).contains(n))
}

fn candidate(number: u8, index: usize, token: &TextToken, confidence: f64) -> BalloonCandidate {
    BalloonCandidate {
        id: balloon_id(number, index),
        number,
        center: token.center(),
        radius: token.width.max(token.height) / 2.0 + BALLOON_RADIUS_PAD,
        confidence,
        source_type: BalloonShape::Circle,
    }
}

/// One candidate per token, so the token index keeps ids unique within a run
fn balloon_id(number: u8, token_index: usize) -> String {
    format!("balloon-{}-{}", number, token_index)
}
