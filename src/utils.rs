// Utility functions
use chrono::{DateTime, NaiveDate, Utc};

/// Parses a scraped timestamp into `DateTime<Utc>`: RFC 3339 first, then a bare date.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

/// Cuts text to at most `max` characters for log lines.
pub fn truncate_for_log(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

pub fn join_topics(topics: &[String]) -> String {
    topics.join(", ")
}
