//! # Analysis Client
//!
//! Talks to the remote analysis service. One call to [`AnalysisClient::analyze`]
//! is exactly one HTTP request: no retries, no caching and no deduplication
//! of identical in-flight requests.

use crate::config::ClientConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{AnalysisReport, AnalysisRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Anything able to answer an analysis request.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult<AnalysisReport>;
}

#[derive(Serialize)]
struct CodeBody<'a> {
    code: &'a str,
}

/// HTTP implementation of [`AnalysisClient`].
pub struct HttpAnalysisClient {
    client: Client,
    config: ClientConfig,
}

impl HttpAnalysisClient {
    pub fn new(config: ClientConfig) -> AnalysisResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnalysisError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Fetches the service banner from `GET /`.
    #[instrument(skip(self), fields(url = %self.config.health_url()))]
    pub async fn health(&self) -> AnalysisResult<String> {
        let response = self.client.get(self.config.health_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let banner: Value = response.json().await?;
        let message = banner
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("service reachable")
            .to_string();
        debug!("Health banner: {}", message);
        Ok(message)
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    #[instrument(
        skip(self, request),
        fields(mode = %request.mode(), bytes = request.source_text.len())
    )]
    async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult<AnalysisReport> {
        let mut builder = self
            .client
            .post(self.config.analyze_url())
            .json(&CodeBody {
                code: &request.source_text,
            });
        if let Some(function_name) = &request.target_function {
            builder = builder.query(&[("function_name", function_name)]);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| AnalysisError::malformed(format!("response is not JSON: {e}")))?;
        let report = AnalysisReport::from_value(value)?;

        info!(
            "Analysis returned {} function(s), flowchart: {}",
            report.function_count(),
            report.diagram_description().is_some()
        );
        Ok(report)
    }
}
