//! HTTP utilities for GCP REST API calls

use crate::error::{Error, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for GCP API calls
#[derive(Clone)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gcp-tables/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request to a GCP API
    ///
    /// `service` only labels errors and log lines.
    pub async fn get(
        &self,
        service: &'static str,
        url: &str,
        token: &str,
        query: &[(&str, String)],
    ) -> Result<Value> {
        let url = add_query_params(url, query);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                "{} API error: {} - {}",
                service,
                status,
                sanitize_for_log(&body)
            );
            return Err(api_error(service, status, &body));
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Build an [`Error::Api`] from a non-success response.
///
/// GCP error bodies look like
/// `{"error": {"code": 403, "message": "...", "status": "PERMISSION_DENIED"}}`.
fn api_error(service: &'static str, status: StatusCode, body: &str) -> Error {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    let reason = error
        .and_then(|e| e.get("status"))
        .and_then(|s| s.as_str())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("UNKNOWN"))
        .to_string();
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(sanitize_for_log)
        .unwrap_or_else(|| "API request failed".to_string());

    Error::Api {
        service,
        status: status.as_u16(),
        reason,
        message,
    }
}

fn add_query_params(url: &str, params: &[(&str, String)]) -> String {
    let query_parts: Vec<String> = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();

    if query_parts.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, query_parts.join("&"))
    } else {
        format!("{}?{}", url, query_parts.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_query_params() {
        let url = add_query_params(
            "https://file.googleapis.com/v1/projects/p/locations/l/instances",
            &[("pageToken", "a b/c".to_string()), ("filter", String::new())],
        );
        assert_eq!(
            url,
            "https://file.googleapis.com/v1/projects/p/locations/l/instances?pageToken=a%20b%2Fc"
        );
        assert_eq!(add_query_params("https://x/y?a=1", &[("b", "2".to_string())]), "https://x/y?a=1&b=2");
    }

    #[test]
    fn test_api_error_parses_google_body() {
        let body = r#"{"error": {"code": 403, "message": "caller lacks permission", "status": "PERMISSION_DENIED"}}"#;
        match api_error("privateca", StatusCode::FORBIDDEN, body) {
            Error::Api {
                service,
                status,
                reason,
                message,
            } => {
                assert_eq!(service, "privateca");
                assert_eq!(status, 403);
                assert_eq!(reason, "PERMISSION_DENIED");
                assert_eq!(message, "caller lacks permission");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_without_body() {
        let err = api_error("file", StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(matches!(err, Error::Api { status: 503, ref reason, .. } if reason == "Service Unavailable"));
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(500);
        let sanitized = sanitize_for_log(&long);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("500 bytes total"));
        assert_eq!(sanitize_for_log("a\nb"), "ab");
    }
}
