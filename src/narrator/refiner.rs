// narrator/refiner.rs

use crate::model::CapabilityError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

const CAPABILITY: &str = "narrative refiner";

pub const OPENAI_CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are an expert business analyst specializing in news sentiment analysis. \
Your role is to review aggregated data from news articles, understand competitor dynamics and market trends, \
and provide refined, actionable business insights.";

const USER_PROMPT: &str = "Based on the following JSON output from our news sentiment analysis tool, \
please provide a comprehensive business-specific analysis. Include insights on competitor impact, \
market trends, and strategic recommendations for the company. Here is the data:\n\n";

#[async_trait::async_trait]
pub trait NarrativeRefiner: Send + Sync {
    /// Turns the reduced report JSON into a business narrative.
    async fn refine(&self, reduced_report_json: &str) -> Result<String, CapabilityError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Extracts the first choice's text from a chat completions body.
pub fn parse_chat_response(body: &str) -> Result<String, CapabilityError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| CapabilityError::malformed(CAPABILITY, e))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| CapabilityError::malformed(CAPABILITY, "no content in response"))
}

pub struct OpenAiRefiner {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiRefiner {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, CapabilityError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CapabilityError::request(CAPABILITY, e))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: OPENAI_CHAT_ENDPOINT.to_string(),
        })
    }

    fn build_request<'a>(&'a self, reduced_report_json: &str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("{}{}", USER_PROMPT, reduced_report_json),
                },
            ],
            temperature: 0.7,
            max_tokens: 300,
        }
    }
}

#[async_trait::async_trait]
impl NarrativeRefiner for OpenAiRefiner {
    async fn refine(&self, reduced_report_json: &str) -> Result<String, CapabilityError> {
        info!("Requesting refined business analysis from {}...", self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(reduced_report_json))
            .send()
            .await
            .map_err(|e| CapabilityError::request(CAPABILITY, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CapabilityError::request(CAPABILITY, e))?;

        if !status.is_success() {
            warn!("OpenAI API responded [{}]: {}", status, body);
            return Err(CapabilityError::request(CAPABILITY, format!("OpenAI API error ({})", status)));
        }

        parse_chat_response(&body)
    }
}
