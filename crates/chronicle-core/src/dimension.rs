//! Thematic dimensions and their scores.
//!
//! Every node is scored along a handful of named axes. The vocabulary is
//! closed: the five well-known dimensions are enum variants, and anything
//! else has to come through [`Dimension::Custom`] with a validated name.

use crate::error::DatasetError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A named axis along which a node's significance is scored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dimension {
    Technical,
    Societal,
    Philosophical,
    Economic,
    Geopolitical,

    /// Extension point for dataset-specific axes.
    ///
    /// The name is lowercase ASCII letters, digits and underscores.
    Custom(String),
}

impl Dimension {
    /// All built-in dimensions, in display order.
    pub const KNOWN: [Dimension; 5] = [
        Dimension::Technical,
        Dimension::Societal,
        Dimension::Philosophical,
        Dimension::Economic,
        Dimension::Geopolitical,
    ];

    /// Returns the serialized name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Technical => "technical",
            Self::Societal => "societal",
            Self::Philosophical => "philosophical",
            Self::Economic => "economic",
            Self::Geopolitical => "geopolitical",
            Self::Custom(name) => name,
        }
    }

    /// Creates a dimension from its name, validating it.
    ///
    /// Surrounding whitespace and case are ignored.
    pub fn custom(name: impl Into<String>) -> Result<Self, DatasetError> {
        let name: String = name.into();
        let name = name.trim().to_lowercase();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(DatasetError::InvalidDimension(name));
        }
        // Built-in names always map to their variant.
        Ok(match name.as_str() {
            "technical" => Self::Technical,
            "societal" => Self::Societal,
            "philosophical" => Self::Philosophical,
            "economic" => Self::Economic,
            "geopolitical" => Self::Geopolitical,
            _ => Self::Custom(name),
        })
    }

    /// Returns true for the five built-in dimensions.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::custom(s)
    }
}

impl TryFrom<String> for Dimension {
    type Error = DatasetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::custom(value)
    }
}

impl From<Dimension> for String {
    fn from(value: Dimension) -> Self {
        value.as_str().to_string()
    }
}

/// A thematic score, always within `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: Score = Score(0);
    pub const MAX: Score = Score(10);

    /// Creates a score, rejecting values outside `0..=10`.
    pub fn new(value: i64) -> Result<Self, DatasetError> {
        if (0..=10).contains(&value) {
            Ok(Score(value as u8))
        } else {
            Err(DatasetError::InvalidScore(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = DatasetError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

/// Per-dimension scores for a single node.
///
/// A dimension that is absent is not the same as a score of zero: the
/// threshold filter drops nodes that lack an active dimension entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThematicScores(BTreeMap<Dimension, Score>);

impl ThematicScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, dimension: Dimension, score: Score) -> Self {
        self.0.insert(dimension, score);
        self
    }

    pub fn get(&self, dimension: &Dimension) -> Option<Score> {
        self.0.get(dimension).copied()
    }

    pub fn set(&mut self, dimension: Dimension, score: Score) -> Option<Score> {
        self.0.insert(dimension, score)
    }

    pub fn remove(&mut self, dimension: &Dimension) -> Option<Score> {
        self.0.remove(dimension)
    }

    /// Sum of every score this node carries.
    pub fn total(&self) -> u32 {
        self.0.values().map(|s| u32::from(s.value())).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Dimension, Score)> {
        self.0.iter().map(|(d, s)| (d, *s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Dimension, Score)> for ThematicScores {
    fn from_iter<I: IntoIterator<Item = (Dimension, Score)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_map_to_variants() {
        assert_eq!(Dimension::custom("economic").unwrap(), Dimension::Economic);
        assert_eq!(
            "Philosophical".parse::<Dimension>().unwrap(),
            Dimension::Philosophical
        );
        assert!(Dimension::Geopolitical.is_known());
    }

    #[test]
    fn test_custom_dimension_validation() {
        let d = Dimension::custom("cultural_impact").unwrap();
        assert_eq!(d, Dimension::Custom("cultural_impact".to_string()));
        assert!(!d.is_known());

        assert!(Dimension::custom("").is_err());
        assert!(Dimension::custom("has space").is_err());
        assert!(Dimension::custom("dash-name").is_err());
    }

    #[test]
    fn test_score_bounds() {
        assert_eq!(Score::new(0).unwrap(), Score::MIN);
        assert_eq!(Score::new(10).unwrap(), Score::MAX);
        assert!(matches!(Score::new(11), Err(DatasetError::InvalidScore(11))));
        assert!(Score::new(-1).is_err());
    }

    #[test]
    fn test_scores_deserialize_from_map() {
        let scores: ThematicScores =
            serde_json::from_str(r#"{"technical": 9, "societal": 4, "ethics": 2}"#).unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores.get(&Dimension::Technical), Some(Score::new(9).unwrap()));
        assert_eq!(scores.get(&Dimension::Custom("ethics".into())).map(Score::value), Some(2));
        assert_eq!(scores.get(&Dimension::Economic), None);
        assert_eq!(scores.total(), 15);
    }

    #[test]
    fn test_dimension_keys_ignore_case() {
        let scores: ThematicScores =
            serde_json::from_str(r#"{"Technical": 9, " Ethics ": 2}"#).unwrap();
        assert_eq!(scores.get(&Dimension::Technical).map(Score::value), Some(9));
        assert_eq!(scores.get(&Dimension::Custom("ethics".into())).map(Score::value), Some(2));
        assert_eq!(Dimension::custom("SOCIETAL").unwrap(), Dimension::Societal);
    }

    #[test]
    fn test_out_of_range_score_is_rejected() {
        let result: Result<ThematicScores, _> = serde_json::from_str(r#"{"technical": 12}"#);
        assert!(result.is_err());
    }
}
