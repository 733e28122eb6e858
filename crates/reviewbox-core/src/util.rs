//! Small text helpers for form input and relay responses.

/// Trimmed text, or `None` when nothing but whitespace was entered.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Relay endpoints must be plain `http://` or `https://` URLs.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

const RESPONSE_EXCERPT_CHARS: usize = 180;

/// Excerpt of an endpoint response body, short enough for one log line.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(RESPONSE_EXCERPT_CHARS).collect()
}
