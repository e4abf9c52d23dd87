//! Platform and bound descriptor normalization.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::AgencyConfig;
use crate::model::{CardinalDirection, Position};

// Compass letters followed by the bound word, whole text only
#[allow(clippy::unwrap_used)] // Static regex pattern is hardcoded and valid
static BOUND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^([NESW]+)-bound$").unwrap());

/// Agency-specific step tried before the generic fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionRule {
    /// `<letters>-bound`, letters from `{N, E, S, W}`, case-insensitive.
    Bound,
    /// Remove a leading literal, then hand the rest to the generic fallback.
    StripPrefix(String),
}

impl PositionRule {
    /// Position if this rule applies to `text`.
    ///
    /// Patterns are matched against `text` with surrounding whitespace
    /// removed; the returned name is taken from `text` itself.
    #[must_use]
    pub fn apply(&self, text: &str) -> Option<Position> {
        let trimmed = text.trim();
        match self {
            PositionRule::Bound => parse_bound(trimmed).map(|direction| Position {
                name: text.to_owned(),
                direction: Some(direction),
            }),
            PositionRule::StripPrefix(prefix) => trimmed
                .strip_prefix(prefix.as_str())
                .filter(|rest| !rest.is_empty())
                .map(generic_position),
        }
    }
}

/// Parse `N-bound`, `ne-bound`, ... into compass letters.
#[must_use]
pub fn parse_bound(text: &str) -> Option<CardinalDirection> {
    BOUND
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|letters| CardinalDirection::parse(letters.as_str()))
}

/// Normalize raw position text with the agency's rules.
///
/// Missing input stays absent; any text, even empty, yields a position.
#[must_use]
pub fn normalize_position(config: &AgencyConfig, raw: Option<&str>) -> Option<Position> {
    let text = raw?;
    for rule in &config.position_rules {
        if let Some(position) = rule.apply(text) {
            trace!(agency = %config.id, ?rule, "position rule matched");
            return Some(position);
        }
    }
    Some(generic_position(text))
}

/// Terminal step: the text unchanged, with no direction.
#[must_use]
pub fn generic_position(text: &str) -> Position {
    Position::new(text)
}
