use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const MAX_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub newsapi_key: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,
    #[serde(default = "default_speech_language")]
    pub speech_language: String,
    #[serde(default = "default_true")]
    pub speech_enabled: bool,
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_max_topics() -> usize {
    3
}

fn default_speech_language() -> String {
    "hi".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) NewsPulse/0.1".to_string()
}

impl AppConfig {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.newsapi_key.trim().is_empty() {
            return Err(ConfigError::Invalid("newsapi_key must not be empty".into()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.max_topics == 0 {
            return Err(ConfigError::Invalid("max_topics must be at least 1".into()));
        }
        Ok(self)
    }

    /// OpenAI key, ignoring blank values.
    pub fn refiner_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
