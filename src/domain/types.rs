use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /check`. Entries of `urls` stay raw JSON so that
/// non-string items can be echoed back instead of failing the request.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRequest {
    pub urls: Vec<Value>,
    #[serde(default)]
    pub email: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlVerdict {
    pub url: Value,
    pub spam: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    pub ok: bool,
    pub results: Vec<UrlVerdict>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub ok: bool,
    pub received: bool,
    pub added: usize,
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterResponse {
    pub ok: bool,
    pub original: Vec<Value>,
    pub filtered: Vec<String>,
    pub original_count: usize,
    pub members_count: usize,
    pub filtered_count: usize,
}
