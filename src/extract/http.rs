//! HTTP client for the table-recognition service.
//!
//! Wire contract:
//!
//! - `POST {endpoint}/extract-table`, multipart form with one file field
//!   named `image` (PNG). Answers `{"tables": [...], "count": n}` on
//!   success and `{"error": "..."}` with a 4xx/5xx status on failure.
//! - `GET {endpoint}/health` answers `{"status": "healthy", "textract_available": bool}`.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ExtractOptions, RecognitionResponse, TableRecognizer};
use crate::error::ExtractionError;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Service health as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Free-form status, `"healthy"` when up
    pub status: String,

    /// Whether the recognition backend is reachable from the service
    #[serde(default)]
    pub textract_available: bool,
}

impl HealthStatus {
    /// True when the service reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// [`TableRecognizer`] backed by the remote HTTP service.
#[derive(Debug, Clone)]
pub struct HttpRecognizer {
    client: Client,
    endpoint: String,
}

impl HttpRecognizer {
    /// Create a recognizer for the service at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    /// Create a recognizer for the service configured in `options`.
    pub fn from_options(options: &ExtractOptions) -> Self {
        Self::new(options.endpoint.clone())
    }

    /// Create a recognizer with a preconfigured client.
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Base URL of the service.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Query the service health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, ExtractionError> {
        let response = self.client.get(self.url("health")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Remote {
                status: Some(status.as_u16()),
                message: status.canonical_reason().unwrap_or("health check failed").to_string(),
            });
        }
        Ok(response.json::<HealthStatus>().await?)
    }
}

impl TableRecognizer for HttpRecognizer {
    async fn recognize(
        &self,
        png: Vec<u8>,
        filename: String,
    ) -> Result<RecognitionResponse, ExtractionError> {
        let size = png.len();
        let part = Part::bytes(png).file_name(filename).mime_str("image/png")?;
        let form = Form::new().part(IMAGE_FIELD, part);

        log::debug!("POST {} ({} bytes)", self.url("extract-table"), size);
        let response = self
            .client
            .post(self.url("extract-table"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Remote {
                status: Some(status.as_u16()),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        Ok(response.json::<RecognitionResponse>().await?)
    }
}

/// Pull the `error` field out of a failure body, falling back to the status reason.
fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<RecognitionResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| reason.unwrap_or("request failed").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let recognizer = HttpRecognizer::new("http://localhost:5000/");
        assert_eq!(recognizer.url("extract-table"), "http://localhost:5000/extract-table");

        let recognizer = HttpRecognizer::new("http://localhost:5000");
        assert_eq!(recognizer.url("health"), "http://localhost:5000/health");
    }

    #[test]
    fn test_from_options_uses_endpoint() {
        let options = ExtractOptions::new().with_endpoint("http://tables.internal:8080");
        let recognizer = HttpRecognizer::from_options(&options);
        assert_eq!(recognizer.endpoint(), "http://tables.internal:8080");
        assert_eq!(
            recognizer.url("extract-table"),
            "http://tables.internal:8080/extract-table"
        );
    }

    #[test]
    fn test_error_message_prefers_body() {
        assert_eq!(
            error_message(r#"{"error": "File too large"}"#, Some("Payload Too Large")),
            "File too large"
        );
        assert_eq!(error_message("<html>", Some("Bad Gateway")), "Bad Gateway");
        assert_eq!(error_message("", None), "request failed");
    }

    #[test]
    fn test_health_status_parse() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "healthy", "textract_available": true}"#).unwrap();
        assert!(health.is_healthy());
        assert!(health.textract_available);

        let health: HealthStatus = serde_json::from_str(r#"{"status": "degraded"}"#).unwrap();
        assert!(!health.is_healthy());
        assert!(!health.textract_available);
    }
}
