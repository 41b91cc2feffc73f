pub mod fetcher;
pub mod traits;

pub use fetcher::NewsApiSource;
pub use traits::ArticleSource;
