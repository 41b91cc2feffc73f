// News article page parsing: title, summary and publication time from page metadata
use crate::model::{Article, ParserError};
use crate::utils::parse_datetime;
use scraper::{ElementRef, Html, Selector};

pub const NO_TITLE: &str = "No title found";
pub const NO_SUMMARY: &str = "No summary found";

pub trait Parser {
    fn parse(&self, html: &str, url: &str) -> Result<Article, ParserError>;
}

pub struct ArticlePageParser {
    og_title: Selector,
    title: Selector,
    description: Selector,
    og_description: Selector,
    paragraph: Selector,
    published_meta: Selector,
    time: Selector,
}

fn selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|e| ParserError::HtmlParseError(e.to_string()))
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ArticlePageParser {
    pub fn new() -> Result<Self, ParserError> {
        Ok(Self {
            og_title: selector(r#"meta[property="og:title"]"#)?,
            title: selector("title")?,
            description: selector(r#"meta[name="description"]"#)?,
            og_description: selector(r#"meta[property="og:description"]"#)?,
            paragraph: selector("p")?,
            published_meta: selector(r#"meta[property="article:published_time"]"#)?,
            time: selector("time")?,
        })
    }

    fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .and_then(non_empty)
    }

    fn element_text(element: ElementRef<'_>) -> Option<String> {
        non_empty(&element.text().collect::<String>())
    }

    fn extract_title(&self, document: &Html) -> String {
        Self::meta_content(document, &self.og_title)
            .or_else(|| document.select(&self.title).next().and_then(Self::element_text))
            .unwrap_or_else(|| NO_TITLE.to_string())
    }

    fn extract_summary(&self, document: &Html) -> String {
        Self::meta_content(document, &self.description)
            .or_else(|| Self::meta_content(document, &self.og_description))
            .or_else(|| document.select(&self.paragraph).next().and_then(Self::element_text))
            .unwrap_or_else(|| NO_SUMMARY.to_string())
    }

    fn extract_published(&self, document: &Html) -> Option<String> {
        Self::meta_content(document, &self.published_meta).or_else(|| {
            document.select(&self.time).next().and_then(|el| {
                el.value()
                    .attr("datetime")
                    .and_then(non_empty)
                    .or_else(|| Self::element_text(el))
            })
        })
    }
}

impl Parser for ArticlePageParser {
    fn parse(&self, html: &str, url: &str) -> Result<Article, ParserError> {
        let document = Html::parse_document(html);

        let published = self
            .extract_published(&document)
            .and_then(|raw| parse_datetime(&raw));

        Ok(Article {
            published,
            ..Article::new(self.extract_title(&document), self.extract_summary(&document), url)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn parse(html: &str) -> Article {
        ArticlePageParser::new()
            .unwrap()
            .parse(html, "https://news.example/a")
            .unwrap()
    }

    #[test]
    fn prefers_open_graph_title_and_description_meta() {
        let article = parse(
            r#"<html><head>
                <title>Site title</title>
                <meta property="og:title" content="Tesla beats estimates">
                <meta name="description" content="Quarterly deliveries rose.">
                <meta property="og:description" content="OG description">
                <meta property="article:published_time" content="2024-04-02T12:00:00Z">
            </head><body><p>First paragraph</p></body></html>"#,
        );
        assert_eq!(article.title, "Tesla beats estimates");
        assert_eq!(article.summary, "Quarterly deliveries rose.");
        assert_eq!(article.url, "https://news.example/a");
        assert_eq!(
            article.published,
            Some(Utc.with_ymd_and_hms(2024, 4, 2, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn falls_back_to_title_tag_og_description_and_time() {
        let article = parse(
            r#"<html><head>
                <title>  Plain title  </title>
                <meta property="og:description" content="From OG">
            </head><body><time datetime="2024-01-15">Jan 15</time></body></html>"#,
        );
        assert_eq!(article.title, "Plain title");
        assert_eq!(article.summary, "From OG");
        assert!(article.published.is_some());
    }

    #[test]
    fn falls_back_to_first_paragraph() {
        let article = parse("<html><body><p> Lead <b>text</b> </p><p>Second</p></body></html>");
        assert_eq!(article.summary, "Lead text");
    }

    #[test]
    fn bare_page_uses_placeholders() {
        let article = parse("<html><body><div>nothing useful</div></body></html>");
        assert_eq!(article.title, NO_TITLE);
        assert_eq!(article.summary, NO_SUMMARY);
        assert!(article.published.is_none());
    }

    #[test]
    fn empty_meta_content_is_ignored() {
        let article = parse(
            r#"<html><head><meta property="og:title" content="  "><title>Real</title></head></html>"#,
        );
        assert_eq!(article.title, "Real");
    }
}
