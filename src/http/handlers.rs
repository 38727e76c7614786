use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

use crate::{
    classify::{digest_value, partition_members, report_candidates},
    domain::{CheckRequest, CheckResponse, FilterResponse, ReportResponse, UrlVerdict},
};

use super::{error::ApiError, multipart, page::FILTER_PAGE, AppState};

/// `POST /check`: reports which of the submitted URLs are known spam and
/// remembers the caller's email as a member.
pub async fn check(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<CheckResponse>, ApiError> {
    let body = body?;
    let request: CheckRequest =
        serde_json::from_value(parse_json_body(&body)).map_err(|_| ApiError::InvalidPayload)?;
    tracing::info!(target: "http", urls = request.urls.len(), "POST /check");

    let digest = request
        .email
        .as_ref()
        .filter(|email| !is_empty_string(email))
        .and_then(digest_value);
    let urls = request.urls;
    let results = blocking(move || {
        if let Some(digest) = digest {
            if state.stores.members.insert(&digest) {
                tracing::info!(target: "http", member = %digest, "new member added");
            }
        }

        let bad_urls = state.stores.bad_urls.load();
        urls.into_iter()
            .map(|url| match url {
                Value::String(raw) => {
                    let trimmed = raw.trim().to_string();
                    let spam = bad_urls.contains(&trimmed);
                    UrlVerdict {
                        url: Value::String(trimmed),
                        spam,
                    }
                }
                other => UrlVerdict {
                    url: other,
                    spam: false,
                },
            })
            .collect::<Vec<_>>()
    })
    .await?;

    Ok(Json(CheckResponse { ok: true, results }))
}

/// `POST /report`: adds every URL mentioned by the report to the bad-URL set.
pub async fn report(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ReportResponse>, ApiError> {
    let payload = parse_json_body(&body?);
    let candidates = report_candidates(&payload);
    tracing::info!(target: "http", candidates = candidates.len(), "POST /report");

    let added = blocking(move || state.stores.bad_urls.insert_all(candidates)).await?;
    if added > 0 {
        tracing::info!(target: "http", added, "bad urls recorded");
    }

    Ok(Json(ReportResponse {
        ok: true,
        received: true,
        added,
        payload,
    }))
}

/// `POST /filter-emails`: drops known members from an uploaded JSON list.
pub async fn filter_emails(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<FilterResponse>, ApiError> {
    let body = body?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let file = multipart::json_file(content_type, &body)?;

    let uploaded: Value =
        serde_json::from_slice(file).map_err(|err| ApiError::InvalidJson(err.to_string()))?;
    let Value::Array(original) = uploaded else {
        return Err(ApiError::NotAnArray);
    };
    tracing::info!(target: "http", emails = original.len(), "POST /filter-emails");

    let members = blocking(move || state.stores.members.load()).await?;
    let partition = partition_members(&original, &members);

    Ok(Json(FilterResponse {
        ok: true,
        original_count: original.len(),
        members_count: partition.members_found,
        filtered_count: partition.filtered.len(),
        original,
        filtered: partition.filtered,
    }))
}

/// `GET /filter`: upload form for `/filter-emails`.
pub async fn filter_page() -> Html<&'static str> {
    Html(FILTER_PAGE)
}

/// Answers preflight requests on any path; everything else that reaches
/// here has no route.
pub async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        ApiError::NotFound.into_response()
    }
}

/// A present but empty `email` means the caller has none to register.
fn is_empty_string(value: &Value) -> bool {
    value.as_str().is_some_and(str::is_empty)
}

/// Empty or malformed bodies become `{}` so validation can report them.
fn parse_json_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Object(Map::new());
    }
    serde_json::from_slice(body).unwrap_or_else(|err| {
        tracing::debug!(target: "http", error = %err, "request body is not JSON");
        Value::Object(Map::new())
    })
}

/// Store access touches the filesystem, so it runs off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))
}
