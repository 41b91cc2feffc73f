use crate::model::{Article, ScraperError};
use crate::parser::{ArticlePageParser, Parser};
use crate::scraper::traits::ArticleSource;
use crate::utils::truncate_for_log;

use futures::future::join_all;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const NEWSAPI_ENDPOINT: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    url: Option<String>,
}

/// Parses a NewsAPI `everything` body into article URLs, skipping entries without one.
pub fn parse_search_response(body: &str) -> Result<Vec<String>, ScraperError> {
    let response: NewsApiResponse =
        serde_json::from_str(body).map_err(|e| ScraperError::InvalidResponse(e.to_string()))?;

    if response.status != "ok" {
        return Err(ScraperError::Api(
            response
                .message
                .unwrap_or_else(|| format!("status '{}'", response.status)),
        ));
    }

    Ok(response
        .articles
        .into_iter()
        .filter_map(|a| a.url)
        .filter(|u| !u.trim().is_empty())
        .collect())
}

pub fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html")
}

/// NewsAPI search followed by scraping each result page.
pub struct NewsApiSource {
    client: Client,
    api_key: String,
    endpoint: String,
    parser: ArticlePageParser,
}

impl NewsApiSource {
    pub fn new(api_key: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        let parser = ArticlePageParser::new().map_err(|e| ScraperError::InvalidResponse(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: NEWSAPI_ENDPOINT.to_string(),
            parser,
        })
    }

    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<String>, ScraperError> {
        let page_size = page_size.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
                ("sortBy", "relevancy"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("NewsAPI response [{}]: {}", status, truncate_for_log(&body, 300));

        // NewsAPI reports errors in the body as well, prefer its message.
        match parse_search_response(&body) {
            Err(ScraperError::InvalidResponse(_)) if !status.is_success() => {
                Err(ScraperError::HttpError(format!("NewsAPI responded {}", status)))
            }
            other => other,
        }
    }

    async fn scrape_page(&self, url: &str) -> Result<Option<Article>, ScraperError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ScraperError::HttpError(format!("{} returned {}", url, response.status())));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_html(&content_type) {
            info!("Skipping non-HTML content: {} ({})", url, content_type);
            return Ok(None);
        }

        let html = response.text().await?;
        let article = self
            .parser
            .parse(&html, url)
            .map_err(|e| ScraperError::InvalidResponse(e.to_string()))?;
        Ok(Some(article))
    }
}

#[async_trait::async_trait]
impl ArticleSource for NewsApiSource {
    async fn fetch_articles(&self, query: &str, page_size: u32) -> Result<Vec<Article>, ScraperError> {
        info!("Searching NewsAPI for '{}' (page size {})...", query, page_size);
        let urls = self.search(query, page_size).await?;
        info!("Fetched {} article URLs", urls.len());

        let pages = join_all(urls.iter().map(|url| self.scrape_page(url))).await;

        let mut articles = Vec::with_capacity(pages.len());
        for (url, page) in urls.iter().zip(pages) {
            match page {
                Ok(Some(article)) => articles.push(article),
                Ok(None) => {}
                Err(e) => warn!("Scraping failed for URL {}: {}", url, e),
            }
        }

        info!("Total scraped articles: {}", articles.len());
        Ok(articles)
    }
}
