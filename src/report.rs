// Final verdict, refiner payload and report assembly
use crate::analyzer::comparative::Analysis;
use crate::model::{
    AnnotatedArticle, ComparativeSentimentScore, FinalReport, Sentiment, SentimentDistribution,
};
use serde::Serialize;

/// Overall outlook derived from positive vs negative counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Positive,
    Negative,
    Balanced,
    NoData,
}

impl Verdict {
    /// Only the canonical labels are counted: positive against negative decides,
    /// neutral only matters for telling an empty batch apart.
    pub fn from_distribution(dist: &SentimentDistribution) -> Self {
        let pos = dist.count(Sentiment::Positive);
        let neg = dist.count(Sentiment::Negative);
        let neu = dist.count(Sentiment::Neutral);

        if pos + neg + neu == 0 {
            Verdict::NoData
        } else if pos > neg {
            Verdict::Positive
        } else if neg > pos {
            Verdict::Negative
        } else {
            Verdict::Balanced
        }
    }

    /// Spoken (Hindi) summary sentence.
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Positive => {
                "समाचार कवरेज अधिकतर सकारात्मक है, जो संभावित विकास का संकेत देती है।"
            }
            Verdict::Negative => {
                "समाचार कवरेज मुख्य रूप से नकारात्मक है, जिसके कारण सावधानी बरतने की आवश्यकता हो सकती है।"
            }
            Verdict::Balanced => "समाचार कवरेज संतुलित प्रतीत होता है।",
            Verdict::NoData => "कोई भावनात्मक डेटा उपलब्ध नहीं है।",
        }
    }
}

/// The only fields the narrative refiner receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReducedReport<'a> {
    #[serde(rename = "Company")]
    pub company: &'a str,
    #[serde(rename = "Sentiment Distribution")]
    pub sentiment_distribution: &'a SentimentDistribution,
    #[serde(rename = "Final Sentiment Analysis")]
    pub final_sentiment_summary: &'a str,
}

impl<'a> ReducedReport<'a> {
    pub fn from_report(report: &'a FinalReport) -> Self {
        Self {
            company: &report.company,
            sentiment_distribution: &report.comparative_sentiment_score.sentiment_distribution,
            final_sentiment_summary: &report.final_sentiment_summary,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Assembles the report without any generated artifacts attached.
pub fn compose(company: &str, articles: Vec<AnnotatedArticle>, analysis: Analysis) -> FinalReport {
    FinalReport {
        company: company.to_string(),
        articles,
        comparative_sentiment_score: ComparativeSentimentScore {
            sentiment_distribution: analysis.report.sentiment_distribution,
            pairwise_contrasts: analysis.pairwise_contrasts,
            topic_overlap: analysis.topic_overlap,
        },
        final_sentiment_summary: analysis.verdict.message().to_string(),
        audio: None,
        refined_narrative: None,
    }
}

impl FinalReport {
    pub fn with_audio(mut self, audio: Option<Vec<u8>>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_refined_narrative(mut self, narrative: Option<String>) -> Self {
        self.refined_narrative = narrative;
        self
    }
}
