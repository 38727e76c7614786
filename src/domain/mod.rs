pub mod types;

pub use types::{CheckRequest, CheckResponse, FilterResponse, ReportResponse, UrlVerdict};
