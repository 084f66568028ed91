//! HTTP transport to the external risk analysis service.
//!
//! One POST per user action, no retries. The response body is handed back as a
//! [`RawPayload`] untouched; shaping it is the normalizer's job.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::normalize::payload::RawPayload;

/// Longest service error detail kept in a [`TransportError::Status`] message.
const MAX_DETAIL_CHARS: usize = 300;

/// What to analyse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Text(String),
    Url(String),
}

/// Failures that prevent a payload from reaching the normalizer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to analysis service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis service returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("analysis service returned invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("analysis service returned JSON that is not an object")]
    NotAnObject,
}

pub struct AnalysisClient {
    http: Client,
    text_url: String,
    url_url: String,
}

impl AnalysisClient {
    pub fn new(service: &ServiceConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(service.timeout_secs))
            .user_agent(concat!("risk-radar/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            text_url: join_url(&service.base_url, &service.text_endpoint),
            url_url: join_url(&service.base_url, &service.url_endpoint),
        })
    }

    /// Submit one request and return the raw response object.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<RawPayload, TransportError> {
        let (endpoint, body) = match request {
            AnalysisRequest::Text(text) => (&self.text_url, json!({ "text": text })),
            AnalysisRequest::Url(url) => (&self.url_url, json!({ "url": url })),
        };

        info!(endpoint = %endpoint, "submitting analysis request");

        let response = self
            .http
            .post(endpoint)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "analysis response received");

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail: error_detail(&text),
            });
        }

        parse_payload(&text)
    }
}

/// Join a base URL and an endpoint path with exactly one `/` between them.
fn join_url(base: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

fn parse_payload(body: &str) -> Result<RawPayload, TransportError> {
    let value: Value = serde_json::from_str(body)?;
    RawPayload::from_value(value).ok_or(TransportError::NotAnObject)
}

/// Pull a readable message out of an error body.
///
/// The service reports failures as `{"detail": "..."}`; anything else is
/// shown as raw text, truncated.
fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    if detail.is_empty() {
        return "no details".to_string();
    }

    if detail.chars().count() > MAX_DETAIL_CHARS {
        let truncated: String = detail.chars().take(MAX_DETAIL_CHARS).collect();
        return format!("{}…", truncated);
    }

    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8000", "/api/analyze-text"),
            "http://localhost:8000/api/analyze-text"
        );
        assert_eq!(
            join_url("http://localhost:8000/", "api/analyze-url"),
            "http://localhost:8000/api/analyze-url"
        );
    }

    #[test]
    fn test_error_detail_from_json() {
        let body = r#"{"detail": "Failed to fetch URL content"}"#;
        assert_eq!(error_detail(body), "Failed to fetch URL content");
    }

    #[test]
    fn test_error_detail_raw_text() {
        assert_eq!(error_detail("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_detail(""), "no details");
    }

    #[test]
    fn test_error_detail_is_truncated() {
        let body = "x".repeat(1000);
        let detail = error_detail(&body);
        assert_eq!(detail.chars().count(), MAX_DETAIL_CHARS + 1);
        assert!(detail.ends_with('…'));
    }

    #[test]
    fn test_parse_payload() {
        assert!(parse_payload(r#"{"status": "success"}"#).is_ok());
        assert!(matches!(
            parse_payload("[1, 2]"),
            Err(TransportError::NotAnObject)
        ));
        assert!(matches!(
            parse_payload("<html>"),
            Err(TransportError::Decode(_))
        ));
    }

    #[test]
    fn test_client_uses_configured_endpoints() {
        let service = ServiceConfig {
            base_url: "https://risk.example.com/".to_string(),
            ..Default::default()
        };
        let client = AnalysisClient::new(&service).unwrap();
        assert_eq!(client.text_url, "https://risk.example.com/api/analyze-text");
        assert_eq!(client.url_url, "https://risk.example.com/api/analyze-url");
    }
}
