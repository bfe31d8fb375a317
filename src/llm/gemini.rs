//! Gemini `generateContent` provider with function-calling support.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{FunctionSchema, NluProvider, StructuredArgs};

pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiProvider {
    /// Create a provider for the given model, e.g. "gemini-2.5-flash".
    /// The API key comes from the host's bootstrap layer (GOOGLE_API_KEY).
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(15))
            .timeout(std::time::Duration::from_secs(120))
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            api_key,
            model,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        )
    }

    /// Parse a response body as JSON, returning a clear error if the server
    /// returned HTML (proxy error pages, outages).
    async fn parse_json_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &str,
    ) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response body from {}: {}", endpoint, e))?;
        let trimmed = body.trim_start();
        if trimmed.starts_with('<') || trimmed.starts_with("<!") {
            let preview: String = trimmed.chars().take(200).collect();
            return Err(anyhow!(
                "Endpoint {} returned HTML instead of JSON (HTTP {}) — service may be down. Response: {}",
                endpoint,
                status,
                preview
            ));
        }
        serde_json::from_str::<T>(&body).map_err(|e| {
            let preview: String = body.chars().take(300).collect();
            anyhow!(
                "Failed to parse JSON from {} (HTTP {}): {}. Body: {}",
                endpoint,
                status,
                e,
                preview
            )
        })
    }

    async fn send(&self, request: serde_json::Value) -> Result<GenerateContentResponse> {
        let endpoint = self.endpoint();
        let response = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("Request to {} timed out — check network connectivity", endpoint)
                } else if e.is_connect() {
                    anyhow!(
                        "Failed to connect to {} — check network/firewall/proxy: {}",
                        endpoint,
                        e
                    )
                } else {
                    anyhow!("Request to {} failed: {}", endpoint, e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await?;
            return Err(anyhow!("Gemini API error ({}): {}", status, error));
        }

        Self::parse_json_response(response, &endpoint).await
    }
}

#[async_trait]
impl NluProvider for GeminiProvider {
    async fn extract(&self, prompt: &str, schema: &FunctionSchema) -> Result<StructuredArgs> {
        let request = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "tools": [{
                "functionDeclarations": [{
                    "name": schema.name,
                    "description": schema.description,
                    "parameters": schema.parameters,
                }]
            }],
            "toolConfig": {
                "functionCallingConfig": {
                    "mode": "ANY",
                    "allowedFunctionNames": [schema.name]
                }
            }
        });

        let result = self.send(request).await?;
        result
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.function_call)
            .map(|call| call.args)
            .ok_or_else(|| anyhow!("Gemini did not return a structured function call"))
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }]
        });

        let result = self.send(request).await?;
        result
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| anyhow!("Gemini returned no text parts"))
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<Part>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Part {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct FunctionCall {
    #[allow(dead_code)]
    name: String,
    #[serde(default)]
    args: StructuredArgs,
}
