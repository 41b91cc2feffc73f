pub mod article_parser;

pub use article_parser::{ArticlePageParser, Parser};
