//! Topic extraction capability and a RAKE (Rapid Automatic Keyword Extraction) adapter.

use crate::model::CapabilityError;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use stop_words::{LANGUAGE, get};

const CAPABILITY: &str = "topic extractor";

pub trait TopicExtractor: Send + Sync {
    /// Returns at most `max_topics` topics, best first.
    fn extract(&self, text: &str, max_topics: usize) -> Result<Vec<String>, CapabilityError>;
}

pub struct RakeExtractor {
    stopwords: HashSet<String>,
    sentence_split: Regex,
    token: Regex,
}

impl RakeExtractor {
    pub fn new() -> Result<Self, CapabilityError> {
        let stopwords = get(LANGUAGE::English)
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect();
        Self::with_stopwords(stopwords)
    }

    pub fn with_stopwords(stopwords: HashSet<String>) -> Result<Self, CapabilityError> {
        let sentence_split =
            Regex::new(r"[.!?]\s+").map_err(|e| CapabilityError::request(CAPABILITY, e))?;
        let token =
            Regex::new(r"\w+|[^\w\s]+").map_err(|e| CapabilityError::request(CAPABILITY, e))?;
        Ok(Self {
            stopwords,
            sentence_split,
            token,
        })
    }

    fn candidate_phrases(&self, text: &str) -> Vec<Vec<String>> {
        let mut phrases = Vec::new();
        for sentence in self.sentence_split.split(text) {
            let mut current: Vec<String> = Vec::new();
            for m in self.token.find_iter(sentence) {
                let word = m.as_str().to_lowercase();
                let is_punct = !word.chars().any(|c| c.is_alphanumeric() || c == '_');
                if is_punct || self.stopwords.contains(&word) {
                    if !current.is_empty() {
                        phrases.push(std::mem::take(&mut current));
                    }
                } else {
                    current.push(word);
                }
            }
            if !current.is_empty() {
                phrases.push(current);
            }
        }
        phrases
    }
}

impl TopicExtractor for RakeExtractor {
    fn extract(&self, text: &str, max_topics: usize) -> Result<Vec<String>, CapabilityError> {
        if text.trim().is_empty() || max_topics == 0 {
            return Ok(Vec::new());
        }

        let phrases = self.candidate_phrases(text);

        let mut frequency: HashMap<&str, f64> = HashMap::new();
        let mut degree: HashMap<&str, f64> = HashMap::new();
        for phrase in &phrases {
            let len = phrase.len() as f64;
            for word in phrase {
                *frequency.entry(word.as_str()).or_default() += 1.0;
                *degree.entry(word.as_str()).or_default() += len;
            }
        }

        let mut ranked: Vec<(f64, String)> = phrases
            .iter()
            .map(|phrase| {
                let score = phrase
                    .iter()
                    .map(|w| degree[w.as_str()] / frequency[w.as_str()])
                    .sum::<f64>();
                (score, phrase.join(" "))
            })
            .collect();

        // Highest score first; equal scores ordered by phrase, descending.
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

        Ok(ranked
            .into_iter()
            .map(|(_, phrase)| phrase)
            .take(max_topics)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RakeExtractor {
        let stopwords = ["the", "a", "of", "and", "is", "in", "for", "its", "on"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        RakeExtractor::with_stopwords(stopwords).unwrap()
    }

    #[test]
    fn longer_phrases_rank_first() {
        let topics = extractor()
            .extract("Tesla announces new battery technology. The stock is up.", 3)
            .unwrap();
        assert_eq!(topics[0], "tesla announces new battery technology");
        assert!(topics.contains(&"stock".to_string()));
    }

    #[test]
    fn punctuation_breaks_phrases() {
        let topics = extractor().extract("electric cars, solar panels", 5).unwrap();
        assert_eq!(topics, vec!["solar panels", "electric cars"]);
    }

    #[test]
    fn respects_max_topics() {
        let topics = extractor()
            .extract("alpha beta. gamma delta. epsilon zeta. eta theta.", 2)
            .unwrap();
        assert_eq!(topics.len(), 2);
    }

    #[test]
    fn empty_text_has_no_topics() {
        assert!(extractor().extract("  ", 3).unwrap().is_empty());
        assert!(extractor().extract("the and of", 3).unwrap().is_empty());
    }

    #[test]
    fn default_stopword_list_is_loaded() {
        let rake = RakeExtractor::new().unwrap();
        assert!(rake.stopwords.contains("the"));
    }
}
