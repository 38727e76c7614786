use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("valid url regex")
});

pub fn extract_urls(text: &str) -> Vec<String> {
    URL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn extract_from_value(value: &Value) -> Vec<String> {
    value.as_str().map(extract_urls).unwrap_or_default()
}

/// Spam URL candidates carried by a report: the string entries of a
/// top-level `urls` array, then every URL found in top-level string fields.
pub fn report_candidates(payload: &Value) -> Vec<String> {
    let Some(fields) = payload.as_object() else {
        return Vec::new();
    };

    let mut candidates: Vec<String> = match fields.get("urls") {
        Some(Value::Array(urls)) => urls
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    for value in fields.values() {
        candidates.extend(extract_from_value(value));
    }
    candidates
}
