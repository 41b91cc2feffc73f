use crate::analyzer::sentiment::SentimentScorer;
use crate::analyzer::topics::TopicExtractor;
use crate::model::{AnnotatedArticle, AnnotationError, Article, CapabilityError, Sentiment};
use crate::normalizer::TextNormalizer;
use tracing::debug;

pub const DEFAULT_MAX_TOPICS: usize = 3;

/// Text handed to the normalizer for one article.
pub fn article_text(article: &Article) -> String {
    format!("{}. {}", article.title, article.summary)
}

/// Labels the scorer reports outside the canonical set are counted as Neutral.
pub fn resolve_label(label: &str) -> Sentiment {
    Sentiment::from_label(label).unwrap_or_else(|| {
        debug!("Unrecognized sentiment label '{}', using Neutral", label);
        Sentiment::Neutral
    })
}

fn dedup_topics(topics: Vec<String>, max_topics: usize) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::with_capacity(max_topics);
    for topic in topics {
        if distinct.len() == max_topics {
            break;
        }
        if !distinct.contains(&topic) {
            distinct.push(topic);
        }
    }
    distinct
}

fn annotate_one(
    article: &Article,
    normalizer: &dyn TextNormalizer,
    scorer: &dyn SentimentScorer,
    extractor: &dyn TopicExtractor,
    max_topics: usize,
) -> Result<AnnotatedArticle, CapabilityError> {
    let cleaned = normalizer.clean(&article_text(article))?;
    let score = scorer.score(&cleaned)?;
    let topics = extractor.extract(&cleaned, max_topics)?;

    Ok(AnnotatedArticle {
        title: article.title.clone(),
        summary: article.summary.clone(),
        url: article.url.clone(),
        published: article.published,
        sentiment: resolve_label(&score.label),
        sentiment_scores: score.scores,
        topics: dedup_topics(topics, max_topics),
    })
}

/// Annotates every article in order. The first failure aborts the batch.
pub fn annotate(
    articles: &[Article],
    normalizer: &dyn TextNormalizer,
    scorer: &dyn SentimentScorer,
    extractor: &dyn TopicExtractor,
    max_topics: usize,
) -> Result<Vec<AnnotatedArticle>, AnnotationError> {
    articles
        .iter()
        .enumerate()
        .map(|(index, article)| {
            annotate_one(article, normalizer, scorer, extractor, max_topics)
                .map_err(|source| AnnotationError { index, source })
        })
        .collect()
}
