use crate::model::{Article, ScraperError};

#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Searches for `query` and returns up to `page_size` scraped articles, in
    /// relevance order.
    async fn fetch_articles(&self, query: &str, page_size: u32) -> Result<Vec<Article>, ScraperError>;
}
