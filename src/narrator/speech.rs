// narrator/speech.rs

use crate::model::CapabilityError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

const CAPABILITY: &str = "speech synthesizer";

pub const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";
/// Longest text the translate TTS endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns MP3 bytes for `text` spoken in `language`.
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, CapabilityError>;
}

/// Splits text at whitespace into chunks of at most `max_chars` characters.
/// Single words longer than the limit are cut.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            chunks.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current.is_empty() { word.len() } else { word.len() + 1 };
        if current.chars().count() + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

pub struct GoogleTts {
    client: Client,
    endpoint: String,
}

impl GoogleTts {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CapabilityError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| CapabilityError::request(CAPABILITY, e))?;
        Ok(Self {
            client,
            endpoint: TTS_ENDPOINT.to_string(),
        })
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, CapabilityError> {
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", language),
                ("client", "tw-ob"),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CapabilityError::request(CAPABILITY, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CapabilityError::request(CAPABILITY, format!("TTS endpoint responded {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CapabilityError::request(CAPABILITY, e))?;
        if bytes.is_empty() {
            return Err(CapabilityError::malformed(CAPABILITY, "empty audio chunk"));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, CapabilityError> {
        let chunks = split_for_speech(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(CapabilityError::request(CAPABILITY, "no text to speak"));
        }

        info!("Synthesizing speech ({} chunks, language '{}')...", chunks.len(), language);
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let part = self.fetch_chunk(chunk, language, idx, chunks.len()).await?;
            debug!("Chunk {}/{}: {} bytes", idx + 1, chunks.len(), part.len());
            audio.extend_from_slice(&part);
        }
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        assert_eq!(split_for_speech("नमस्ते दुनिया", 100), vec!["नमस्ते दुनिया"]);
    }

    #[test]
    fn chunks_break_at_whitespace_within_limit() {
        let chunks = split_for_speech("aaa bbb ccc ddd", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc ddd"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 7));
    }

    #[test]
    fn long_word_is_cut() {
        let chunks = split_for_speech("ab abcdefghij cd", 4);
        assert_eq!(chunks, vec!["ab", "abcd", "efgh", "ij", "cd"]);
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let text = "सकारात्मक ".repeat(30);
        for chunk in split_for_speech(&text, MAX_CHUNK_CHARS) {
            assert!(chunk.chars().count() <= MAX_CHUNK_CHARS);
        }
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(split_for_speech("  \n ", 100).is_empty());
    }

    #[tokio::test]
    async fn blank_text_is_rejected_without_network() {
        let tts = GoogleTts::new("test", Duration::from_secs(1)).unwrap();
        assert!(tts.synthesize("   ", "hi").await.is_err());
    }
}
