use crate::{
    config::GeminiConfig,
    error::{MonumentError, Result},
    gemini::Gateway,
    models::{GenerationRequest, UpstreamReply},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct GeminiGateway {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiGateway {
    /// Fails when no API key is configured.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(MonumentError::missing_api_key)?
            .to_string();

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MonumentError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn upstream_error(request: &GenerationRequest, status: u16, body: &str) -> MonumentError {
        let details: Option<Value> = serde_json::from_str(body).ok();
        let message = details
            .as_ref()
            .and_then(|d| d["error"]["message"].as_str())
            .filter(|m| !m.is_empty())
            .map(String::from)
            .unwrap_or_else(|| request.stage.failure_message().to_string());

        MonumentError::UpstreamError {
            status,
            message,
            details: details.or_else(|| Some(raw_details(body))),
        }
    }
}

/// Non-JSON upstream bodies still surface as an object.
fn raw_details(body: &str) -> Value {
    json!({ "raw": body })
}

#[async_trait]
impl Gateway for GeminiGateway {
    async fn invoke(&self, request: &GenerationRequest) -> Result<UpstreamReply> {
        log::info!(
            "Invoking {} for stage {} ({} parts)",
            self.endpoint,
            request.stage,
            request.parts.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request.to_payload())
            .send()
            .await
            .map_err(|e| {
                log::error!("Image API request failed for stage {}: {}", request.stage, e);
                MonumentError::RequestError(format!("Image API request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::error!("Image API error for stage {}: {} {}", request.stage, status, body);
            return Err(Self::upstream_error(request, status.as_u16(), &body));
        }

        UpstreamReply::from_json(&body).map_err(|e| {
            log::error!("Unparseable image API reply for stage {}: {}", request.stage, e);
            MonumentError::UpstreamError {
                status: status.as_u16(),
                message: format!("Invalid response from image API: {}", e),
                details: Some(raw_details(&body)),
            }
        })
    }
}
