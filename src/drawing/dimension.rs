//! Dimension callout grammar
//!
//! Each token's text is matched against an ordered table of grammar rules.
//! The first rule that matches wins. Rules are anchored to the whole token,
//! so a value split across several tokens is never reassembled.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::types::{DimensionRecord, DimensionType, TextToken, Tolerance, ToleranceKind};

/// Unit assigned when a linear callout carries none
pub const DEFAULT_UNIT: &str = "mm";

/// One grammar rule: a pattern and the record it builds from its captures
struct GrammarRule {
    name: &'static str,
    pattern: Regex,
    build: fn(&Captures) -> DimensionRecord,
}

/// Evaluated top to bottom; the first matching rule wins
static GRAMMAR: LazyLock<Vec<GrammarRule>> = LazyLock::new(|| {
    vec![
        GrammarRule {
            name: "linear",
            pattern: Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s?(mm|cm|m|in|ft|″|′)?$").unwrap(),
            build: build_linear,
        },
        GrammarRule {
            name: "radial",
            pattern: Regex::new(r"(?i)^R(\d+(?:\.\d+)?)$").unwrap(),
            build: build_radial,
        },
        GrammarRule {
            name: "diameter",
            pattern: Regex::new(r"^[∅⌀](\d+(?:\.\d+)?)$").unwrap(),
            build: build_diameter,
        },
        GrammarRule {
            name: "angular",
            pattern: Regex::new(r"^(\d+(?:\.\d+)?)°$").unwrap(),
            build: build_angular,
        },
        GrammarRule {
            name: "tolerance",
            pattern: Regex::new(r"^(\d+(?:\.\d+)?)\s*±\s*(\d+(?:\.\d+)?)$").unwrap(),
            build: build_tolerance,
        },
    ]
});

fn record(value: &str, unit: &str, dimension_type: DimensionType) -> DimensionRecord {
    DimensionRecord {
        value: value.to_string(),
        unit: unit.to_string(),
        dimension_type,
        tolerance: None,
        gdt_symbol: None,
    }
}

fn build_linear(caps: &Captures) -> DimensionRecord {
    let unit = caps
        .get(2)
        .map(|m| m.as_str().to_lowercase())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_UNIT.to_string());
    record(&caps[1], &unit, DimensionType::Linear)
}

fn build_radial(caps: &Captures) -> DimensionRecord {
    record(&caps[1], DEFAULT_UNIT, DimensionType::Radial)
}

fn build_diameter(caps: &Captures) -> DimensionRecord {
    record(&caps[1], DEFAULT_UNIT, DimensionType::Diameter)
}

fn build_angular(caps: &Captures) -> DimensionRecord {
    record(&caps[1], "°", DimensionType::Angular)
}

fn build_tolerance(caps: &Captures) -> DimensionRecord {
    let band = &caps[2];
    DimensionRecord {
        tolerance: Some(Tolerance {
            upper: band.to_string(),
            lower: format!("-{}", band),
            kind: ToleranceKind::Bilateral,
        }),
        ..record(&caps[1], DEFAULT_UNIT, DimensionType::Linear)
    }
}

/// Stateless parser over the grammar table
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionParser;

impl DimensionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a token's text, returning `None` when no rule matches
    pub fn try_parse(&self, token: &TextToken) -> Option<DimensionRecord> {
        self.parse_text(&token.text)
    }

    /// Parse raw callout text
    pub fn parse_text(&self, text: &str) -> Option<DimensionRecord> {
        let text = text.trim();
        GRAMMAR.iter().find_map(|rule| {
            rule.pattern.captures(text).map(|caps| {
                tracing::trace!("'{}' matched {} rule", text, rule.name);
                (rule.build)(&caps)
            })
        })
    }
}
