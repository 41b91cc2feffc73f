// Core structs: Article, AnnotatedArticle, analysis results and error types
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub published: Option<DateTime<Utc>>,
}

impl Article {
    pub fn new(title: impl Into<String>, summary: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            url: url.into(),
            published: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const CANONICAL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    /// Case-insensitive parse of a scorer label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct SentimentScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

/// Raw scorer output: the label is kept as the scorer reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentScore {
    pub label: String,
    pub scores: SentimentScores,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnnotatedArticle {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Published", skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(rename = "Sentiment")]
    pub sentiment: Sentiment,
    #[serde(rename = "Sentiment Scores")]
    pub sentiment_scores: SentimentScores,
    #[serde(rename = "Topics")]
    pub topics: Vec<String>,
}

/// Label → count map. Starts with the three canonical labels at zero and
/// admits any other label on first occurrence. Insertion order is kept so the
/// canonical labels always serialize first.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentDistribution {
    counts: Vec<(String, usize)>,
}

impl Default for SentimentDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentDistribution {
    pub fn new() -> Self {
        Self {
            counts: Sentiment::CANONICAL
                .iter()
                .map(|s| (s.as_str().to_string(), 0))
                .collect(),
        }
    }

    pub fn record(&mut self, label: &str) {
        match self.counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((label.to_string(), 1)),
        }
    }

    pub fn get(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        self.get(sentiment.as_str())
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(l, c)| (l.as_str(), *c))
    }
}

impl<'a> FromIterator<&'a str> for SentimentDistribution {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut dist = SentimentDistribution::new();
        for label in iter {
            dist.record(label);
        }
        dist
    }
}

impl Serialize for SentimentDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (label, count) in self.iter() {
            map.serialize_entry(label, &count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparativeReport {
    pub sentiment_distribution: SentimentDistribution,
    pub common_topics: Vec<String>,
    pub unique_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PairwiseContrast {
    #[serde(skip)]
    pub article_index_a: usize,
    #[serde(skip)]
    pub article_index_b: usize,
    #[serde(rename = "Comparison")]
    pub narrative: String,
    #[serde(rename = "Impact")]
    pub impact_note: String,
}

/// Exact set comparison for two-article batches, batch-wide common topics otherwise.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum TopicOverlap {
    Pair {
        #[serde(rename = "Common Topics")]
        common: Vec<String>,
        #[serde(rename = "Unique Topics in Article 1")]
        unique_to_first: Vec<String>,
        #[serde(rename = "Unique Topics in Article 2")]
        unique_to_second: Vec<String>,
    },
    Batch {
        #[serde(rename = "Common Topics")]
        common: Vec<String>,
    },
}

impl TopicOverlap {
    pub fn common(&self) -> &[String] {
        match self {
            TopicOverlap::Pair { common, .. } | TopicOverlap::Batch { common } => common,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ComparativeSentimentScore {
    #[serde(rename = "Sentiment Distribution")]
    pub sentiment_distribution: SentimentDistribution,
    #[serde(rename = "Coverage Differences")]
    pub pairwise_contrasts: Vec<PairwiseContrast>,
    #[serde(rename = "Topic Overlap")]
    pub topic_overlap: TopicOverlap,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FinalReport {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Articles")]
    pub articles: Vec<AnnotatedArticle>,
    #[serde(rename = "Comparative Sentiment Score")]
    pub comparative_sentiment_score: ComparativeSentimentScore,
    #[serde(rename = "Final Sentiment Analysis")]
    pub final_sentiment_summary: String,
    #[serde(
        rename = "Audio",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_audio"
    )]
    pub audio: Option<Vec<u8>>,
    #[serde(rename = "Refined Business Analysis", skip_serializing_if = "Option::is_none")]
    pub refined_narrative: Option<String>,
}

fn serialize_audio<S: Serializer>(audio: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    use base64::Engine;
    match audio {
        Some(bytes) => serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub query: String,
    pub page_size: u32,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("news API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for ScraperError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScraperError::Timeout
        } else {
            ScraperError::HttpError(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("HTML parse error: {0}")]
    HtmlParseError(String),
}

/// Failure of any external capability (search, scrape, scoring, extraction,
/// synthesis, refinement).
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("{capability} request failed: {message}")]
    Request { capability: &'static str, message: String },
    #[error("{capability} returned a malformed response: {message}")]
    Malformed { capability: &'static str, message: String },
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Parser(#[from] ParserError),
}

impl CapabilityError {
    pub fn request(capability: &'static str, message: impl fmt::Display) -> Self {
        CapabilityError::Request {
            capability,
            message: message.to_string(),
        }
    }

    pub fn malformed(capability: &'static str, message: impl fmt::Display) -> Self {
        CapabilityError::Malformed {
            capability,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
#[error("annotation of article {} failed: {source}", .index + 1)]
pub struct AnnotationError {
    pub index: usize,
    #[source]
    pub source: CapabilityError,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Acquisition(String),
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Input(_) => 2,
            PipelineError::Acquisition(_) => 3,
            PipelineError::Annotation(_) => 4,
            PipelineError::Capability(_) => 5,
        }
    }
}

/// Structured failure body printed in place of a report.
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub error: String,
}
