//! Balloon-to-dimension correlation
//!
//! Greedy nearest match per balloon. Balloons are matched independently, so
//! two balloons may claim the same dimension token.

use super::dimension::DimensionParser;
use super::pipeline::PipelineConfig;
use super::types::{BalloonCandidate, DimensionMatch, DimensionRecord, TextToken};

/// Lowest confidence a match can carry, reached at the correlation radius
pub const MIN_MATCH_CONFIDENCE: f64 = 0.1;

/// Distance below which a token center is considered the balloon's own center
const SAME_CENTER_EPSILON: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Correlator {
    radius_px: f64,
    skip_balloon_source: bool,
    parser: DimensionParser,
}

impl Correlator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            radius_px: config.correlation_radius_px,
            skip_balloon_source: config.skip_balloon_source,
            parser: DimensionParser::new(),
        }
    }

    /// Produce at most one match per balloon, in balloon order
    pub fn correlate(
        &self,
        tokens: &[TextToken],
        balloons: &[BalloonCandidate],
    ) -> Vec<DimensionMatch> {
        let candidates: Vec<(&TextToken, DimensionRecord)> = tokens
            .iter()
            .filter_map(|token| self.parser.try_parse(token).map(|record| (token, record)))
            .collect();

        let matches: Vec<DimensionMatch> = balloons
            .iter()
            .filter_map(|balloon| self.best_match(balloon, &candidates))
            .collect();

        tracing::debug!(
            "Correlated {} of {} balloons against {} dimension tokens",
            matches.len(),
            balloons.len(),
            candidates.len()
        );
        matches
    }

    fn best_match(
        &self,
        balloon: &BalloonCandidate,
        candidates: &[(&TextToken, DimensionRecord)],
    ) -> Option<DimensionMatch> {
        let mut best: Option<(f64, &TextToken, &DimensionRecord)> = None;

        for (token, record) in candidates {
            if self.skip_balloon_source && is_balloon_source(balloon, token) {
                continue;
            }

            let distance = balloon.center.distance_to(&token.center());
            if distance >= self.radius_px {
                continue;
            }
            if best.map_or(true, |(best_distance, _, _)| distance < best_distance) {
                best = Some((distance, *token, record));
            }
        }

        best.map(|(distance, token, record)| DimensionMatch {
            balloon_id: balloon.id.clone(),
            balloon_number: balloon.number,
            dimension: record.clone(),
            position: token.origin(),
            confidence: self.confidence(distance),
        })
    }

    /// Linear decay from 1.0 at the balloon center to the floor at the radius
    pub fn confidence(&self, distance: f64) -> f64 {
        (1.0 - distance / self.radius_px).clamp(MIN_MATCH_CONFIDENCE, 1.0)
    }
}

/// The token the balloon itself was detected from
fn is_balloon_source(balloon: &BalloonCandidate, token: &TextToken) -> bool {
    token.text.parse::<u8>().ok() == Some(balloon.number)
        && balloon.center.distance_to(&token.center()) < SAME_CENTER_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::balloon::BalloonDetector;
    use crate::drawing::types::{BalloonShape, DimensionType, Point, TokenSource};

    fn balloon_at(number: u8, x: f64, y: f64) -> BalloonCandidate {
        BalloonCandidate {
            id: format!("balloon-{}", number),
            number,
            center: Point::new(x, y),
            radius: 10.0,
            confidence: 0.85,
            source_type: BalloonShape::Circle,
        }
    }

    /// Token whose box center is (cx, cy)
    fn token_centered(text: &str, cx: f64, cy: f64) -> TextToken {
        TextToken::new(text, cx - 10.0, cy - 5.0, 20.0, 10.0).unwrap()
    }

    fn correlator() -> Correlator {
        Correlator::new(&PipelineConfig::default())
    }

    #[test]
    fn test_nearest_within_radius() {
        let tokens = [
            token_centered("25mm", 50.0, 50.0),
            token_centered("30mm", 500.0, 500.0),
        ];
        let matches = correlator().correlate(&tokens, &[balloon_at(1, 0.0, 0.0)]);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.balloon_number, 1);
        assert_eq!(m.balloon_id, "balloon-1");
        assert_eq!(m.dimension.value, "25");
        assert_eq!(m.position, Point::new(40.0, 45.0));
        let expected = 1.0 - (50.0f64 * 2.0f64.sqrt()) / 200.0;
        assert!((m.confidence - expected).abs() < 1e-9);
        assert!((m.confidence - 0.646).abs() < 0.001);
    }

    #[test]
    fn test_radius_is_exclusive() {
        let tokens = [token_centered("R5", 200.0, 0.0)];
        assert!(correlator()
            .correlate(&tokens, &[balloon_at(1, 0.0, 0.0)])
            .is_empty());

        let tokens = [token_centered("R5", 199.0, 0.0)];
        let matches = correlator().correlate(&tokens, &[balloon_at(1, 0.0, 0.0)]);
        assert_eq!(matches.len(), 1);
        assert!((matches[0].confidence - MIN_MATCH_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_bounds() {
        let c = correlator();
        assert_eq!(c.confidence(0.0), 1.0);
        assert_eq!(c.confidence(199.9), MIN_MATCH_CONFIDENCE);
        assert!((c.confidence(100.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_tokens_skipped() {
        let tokens = [
            token_centered("SECTION A-A", 5.0, 5.0),
            token_centered("45°", 60.0, 0.0),
        ];
        let matches = correlator().correlate(&tokens, &[balloon_at(3, 0.0, 0.0)]);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].dimension.dimension_type, DimensionType::Angular);
    }

    #[test]
    fn test_two_balloons_may_share_a_token() {
        let tokens = [token_centered("∅12", 50.0, 0.0)];
        let balloons = [balloon_at(1, 0.0, 0.0), balloon_at(2, 100.0, 0.0)];
        let matches = correlator().correlate(&tokens, &balloons);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].dimension, matches[1].dimension);
    }

    #[test]
    fn test_balloon_does_not_match_its_own_numeral() {
        let tokens = [
            TextToken::new("4", 100.0, 100.0, 10.0, 12.0).unwrap(),
            token_centered("12.5", 180.0, 106.0),
        ];
        let balloons = BalloonDetector::new(&PipelineConfig::default())
            .detect(&tokens, TokenSource::Vector);
        assert_eq!(balloons.len(), 1);

        let matches = correlator().correlate(&tokens, &balloons);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].dimension.value, "12.5");
    }

    #[test]
    fn test_own_numeral_matches_when_skip_disabled() {
        let tokens = [
            TextToken::new("12", 100.0, 100.0, 10.0, 12.0).unwrap(),
            TextToken::new("25mm", 150.0, 100.0, 30.0, 12.0).unwrap(),
        ];
        let config = PipelineConfig {
            skip_balloon_source: false,
            ..PipelineConfig::default()
        };
        let balloons = BalloonDetector::new(&config).detect(&tokens, TokenSource::Vector);
        assert_eq!(balloons.len(), 1);

        let matches = Correlator::new(&config).correlate(&tokens, &balloons);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].dimension.value, "12");
        assert_eq!(matches[0].dimension.unit, "mm");
        assert_eq!(matches[0].confidence, 1.0);

        let matches = correlator().correlate(&tokens, &balloons);
        assert_eq!(matches[0].dimension.value, "25");
    }

    #[test]
    fn test_empty_inputs() {
        let c = correlator();
        assert!(c.correlate(&[], &[]).is_empty());
        assert!(c.correlate(&[], &[balloon_at(1, 0.0, 0.0)]).is_empty());
        assert!(c.correlate(&[token_centered("5mm", 0.0, 0.0)], &[]).is_empty());
    }
}
