use crate::model::CapabilityError;
use regex::Regex;
use scraper::Html;

pub trait TextNormalizer: Send + Sync {
    fn clean(&self, raw: &str) -> Result<String, CapabilityError>;
}

/// Strips markup, drops characters outside a plain-ASCII allow list and
/// collapses whitespace.
pub struct HtmlNormalizer {
    disallowed: Regex,
    whitespace: Regex,
}

impl HtmlNormalizer {
    pub fn new() -> Result<Self, CapabilityError> {
        let disallowed = Regex::new(r"[^a-zA-Z0-9\s.,!?'-]")
            .map_err(|e| CapabilityError::request("text normalizer", e))?;
        let whitespace =
            Regex::new(r"\s+").map_err(|e| CapabilityError::request("text normalizer", e))?;
        Ok(Self { disallowed, whitespace })
    }
}

impl TextNormalizer for HtmlNormalizer {
    fn clean(&self, raw: &str) -> Result<String, CapabilityError> {
        if raw.is_empty() {
            return Ok(String::new());
        }

        let fragment = Html::parse_fragment(raw);
        let text: String = fragment.root_element().text().collect();

        let kept = self.disallowed.replace_all(&text, "");
        let collapsed = self.whitespace.replace_all(&kept, " ");
        Ok(collapsed.trim().to_string())
    }
}
