//! Sentiment scoring capability and its VADER-backed adapter.

use crate::model::{CapabilityError, Sentiment, SentimentScore, SentimentScores};
use std::collections::HashMap;
use vader_sentiment::SentimentIntensityAnalyzer;

const CAPABILITY: &str = "sentiment scorer";

/// Compound score at or above this is Positive, at or below its negation Negative.
pub const COMPOUND_THRESHOLD: f64 = 0.05;

pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<SentimentScore, CapabilityError>;
}

pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for VaderScorer {
    fn score(&self, text: &str) -> Result<SentimentScore, CapabilityError> {
        let raw = self.analyzer.polarity_scores(text);
        let scores = scores_from_map(&raw)?;
        Ok(SentimentScore {
            label: label_for_compound(scores.compound).as_str().to_string(),
            scores,
        })
    }
}

pub fn label_for_compound(compound: f64) -> Sentiment {
    if compound >= COMPOUND_THRESHOLD {
        Sentiment::Positive
    } else if compound <= -COMPOUND_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

fn scores_from_map(raw: &HashMap<&str, f64>) -> Result<SentimentScores, CapabilityError> {
    let field = |key: &str| {
        raw.get(key)
            .copied()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CapabilityError::malformed(CAPABILITY, format!("missing or invalid '{}' score", key)))
    };
    Ok(SentimentScores {
        neg: field("neg")?,
        neu: field("neu")?,
        pos: field("pos")?,
        compound: field("compound")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(label_for_compound(0.05), Sentiment::Positive);
        assert_eq!(label_for_compound(-0.05), Sentiment::Negative);
        assert_eq!(label_for_compound(0.049), Sentiment::Neutral);
        assert_eq!(label_for_compound(0.0), Sentiment::Neutral);
    }

    #[test]
    fn vader_labels_clear_cases() {
        let scorer = VaderScorer::new();
        let good = scorer.score("Profits are great and the outlook is excellent").unwrap();
        assert_eq!(good.label, "Positive");
        assert!(good.scores.compound > 0.0);

        let bad = scorer.score("The recall is a terrible disaster for the company").unwrap();
        assert_eq!(bad.label, "Negative");
        assert!(bad.scores.neg > 0.0);
    }

    #[test]
    fn missing_score_key_is_malformed() {
        let mut raw = HashMap::new();
        raw.insert("neg", 0.1);
        raw.insert("neu", 0.8);
        raw.insert("pos", 0.1);
        let err = scores_from_map(&raw).unwrap_err();
        assert!(matches!(err, CapabilityError::Malformed { .. }));
    }
}
