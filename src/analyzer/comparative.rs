use crate::model::{
    AnnotatedArticle, ComparativeReport, PairwiseContrast, SentimentDistribution, TopicOverlap,
};
use crate::report::Verdict;
use crate::utils::join_topics;
use std::collections::{HashMap, HashSet};

pub const CONTRAST_IMPACT: &str = "This contrast may affect investor sentiment differently.";

/// Everything the engine derives from one annotated batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub report: ComparativeReport,
    pub pairwise_contrasts: Vec<PairwiseContrast>,
    pub topic_overlap: TopicOverlap,
    pub verdict: Verdict,
}

pub struct ComparativeAnalyzer;

impl ComparativeAnalyzer {
    pub fn sentiment_distribution(articles: &[AnnotatedArticle]) -> SentimentDistribution {
        articles.iter().map(|a| a.sentiment.as_str()).collect()
    }

    /// Occurrences of each topic across the batch, one per appearance.
    pub fn topic_frequency(articles: &[AnnotatedArticle]) -> HashMap<&str, usize> {
        let mut freq: HashMap<&str, usize> = HashMap::new();
        for article in articles {
            for topic in &article.topics {
                *freq.entry(topic.as_str()).or_default() += 1;
            }
        }
        freq
    }

    /// Topics passing `keep`, by descending frequency then alphabetically.
    fn ranked_topics(freq: &HashMap<&str, usize>, keep: impl Fn(usize) -> bool) -> Vec<String> {
        let mut topics: Vec<(&str, usize)> = freq
            .iter()
            .filter(|&(_, &count)| keep(count))
            .map(|(&topic, &count)| (topic, count))
            .collect();
        topics.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        topics.into_iter().map(|(t, _)| t.to_string()).collect()
    }

    pub fn compare_articles(articles: &[AnnotatedArticle]) -> ComparativeReport {
        let freq = Self::topic_frequency(articles);
        ComparativeReport {
            sentiment_distribution: Self::sentiment_distribution(articles),
            common_topics: Self::ranked_topics(&freq, |c| c > 1),
            unique_topics: Self::ranked_topics(&freq, |c| c == 1),
        }
    }

    /// One contrast per pair `i < j` whose sentiment labels differ.
    pub fn pairwise_contrasts(articles: &[AnnotatedArticle]) -> Vec<PairwiseContrast> {
        let mut contrasts = Vec::new();
        for (i, a) in articles.iter().enumerate() {
            for (j, b) in articles.iter().enumerate().skip(i + 1) {
                if a.sentiment == b.sentiment {
                    continue;
                }
                contrasts.push(PairwiseContrast {
                    article_index_a: i,
                    article_index_b: j,
                    narrative: format!(
                        "Article {} is {} and focuses on {}, while Article {} is {} and focuses on {}.",
                        i + 1,
                        a.sentiment,
                        join_topics(&a.topics),
                        j + 1,
                        b.sentiment,
                        join_topics(&b.topics),
                    ),
                    impact_note: CONTRAST_IMPACT.to_string(),
                });
            }
        }
        contrasts
    }

    /// Exactly two articles get a true set comparison of their own topics.
    /// Any other batch size reports only the batch-wide common topics.
    pub fn topic_overlap(articles: &[AnnotatedArticle], report: &ComparativeReport) -> TopicOverlap {
        match articles {
            [first, second] => {
                let a: HashSet<&str> = first.topics.iter().map(String::as_str).collect();
                let b: HashSet<&str> = second.topics.iter().map(String::as_str).collect();
                TopicOverlap::Pair {
                    common: sorted_topics(a.intersection(&b)),
                    unique_to_first: sorted_topics(a.difference(&b)),
                    unique_to_second: sorted_topics(b.difference(&a)),
                }
            }
            _ => TopicOverlap::Batch {
                common: report.common_topics.clone(),
            },
        }
    }
}

fn sorted_topics<T: ToString>(topics: impl Iterator<Item = T>) -> Vec<String> {
    let mut sorted: Vec<String> = topics.map(|t| t.to_string()).collect();
    sorted.sort();
    sorted
}

pub fn analyze(articles: &[AnnotatedArticle]) -> Analysis {
    let report = ComparativeAnalyzer::compare_articles(articles);
    let pairwise_contrasts = ComparativeAnalyzer::pairwise_contrasts(articles);
    let topic_overlap = ComparativeAnalyzer::topic_overlap(articles, &report);
    let verdict = Verdict::from_distribution(&report.sentiment_distribution);
    Analysis {
        report,
        pairwise_contrasts,
        topic_overlap,
        verdict,
    }
}
