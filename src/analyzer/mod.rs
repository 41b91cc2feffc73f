// Analyzer module: per-article annotation and batch-level comparison.

pub mod annotate;
pub mod comparative;
pub mod sentiment;
pub mod topics;

// Re-export the entry points for ease of use.
pub use annotate::annotate;
pub use comparative::analyze;
pub use sentiment::{SentimentScorer, VaderScorer};
pub use topics::{RakeExtractor, TopicExtractor};
