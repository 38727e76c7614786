//! Just enough `multipart/form-data` handling to pull one JSON file out of
//! an upload form.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("Expected multipart/form-data")]
    NotMultipart,
    #[error("No boundary found")]
    MissingBoundary,
    #[error("No JSON file found in upload")]
    MissingJsonFile,
}

const FORM_DATA: &str = "multipart/form-data";
const JSON_TYPE: &str = "application/json";

/// Returns the boundary declared by a `multipart/form-data` content type.
pub fn boundary(content_type: &str) -> Result<String, MultipartError> {
    let mut params = content_type.split(';');
    let media_type = params.next().unwrap_or_default().trim();
    if !media_type.eq_ignore_ascii_case(FORM_DATA) {
        return Err(MultipartError::NotMultipart);
    }

    params
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
        .ok_or(MultipartError::MissingBoundary)
}

/// Body of the first file part declared as JSON, trimmed of surrounding
/// whitespace.
pub fn json_file<'a>(content_type: &str, body: &'a [u8]) -> Result<&'a [u8], MultipartError> {
    let boundary = boundary(content_type)?;
    let delimiter = format!("--{boundary}");

    split(body, delimiter.as_bytes())
        .into_iter()
        .skip(1)
        .take_while(|part| !part.starts_with(b"--"))
        .filter_map(Part::parse)
        .find(Part::is_json_file)
        .map(|part| trim_ascii(part.body))
        .filter(|content| !content.is_empty())
        .ok_or(MultipartError::MissingJsonFile)
}

struct Part<'a> {
    disposition: Option<String>,
    content_type: Option<String>,
    body: &'a [u8],
}

impl<'a> Part<'a> {
    fn parse(raw: &'a [u8]) -> Option<Self> {
        let raw = raw.strip_prefix(b"\r\n").or_else(|| raw.strip_prefix(b"\n")).unwrap_or(raw);
        let (head, body) = find(raw, b"\r\n\r\n")
            .map(|at| (&raw[..at], &raw[at + 4..]))
            .or_else(|| find(raw, b"\n\n").map(|at| (&raw[..at], &raw[at + 2..])))?;

        let mut part = Part {
            disposition: None,
            content_type: None,
            body,
        };
        for line in String::from_utf8_lossy(head).lines() {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim().to_string();
            if name.trim().eq_ignore_ascii_case("content-disposition") {
                part.disposition = Some(value);
            } else if name.trim().eq_ignore_ascii_case("content-type") {
                part.content_type = Some(value);
            }
        }
        Some(part)
    }

    fn is_json_file(&self) -> bool {
        let has_filename = self
            .disposition
            .as_deref()
            .is_some_and(|value| value.contains("filename="));
        let is_json = self
            .content_type
            .as_deref()
            .is_some_and(|value| value.to_ascii_lowercase().starts_with(JSON_TYPE));
        has_filename && is_json
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn split<'a>(mut haystack: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    let mut pieces = Vec::new();
    while let Some(at) = find(haystack, delimiter) {
        pieces.push(&haystack[..at]);
        haystack = &haystack[at + delimiter.len()..];
    }
    pieces.push(haystack);
    pieces
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |at| at + 1);
    &bytes[start..end]
}
