//! HTTP utilities for GCP REST API calls

use super::error::{ApiError, OperationResult};
use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", cut, body.len())
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
    /// Create a new HTTP client
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gcpkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str, token: &str) -> OperationResult<Value> {
        let request = self.client.get(url).bearer_auth(token);
        parse_json(self.send(Method::GET, url, request).await?)
    }

    /// Make a POST request with an optional JSON body
    pub async fn post(&self, url: &str, token: &str, body: Option<&Value>) -> OperationResult<Value> {
        let mut request = self.client.post(url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        parse_json(self.send(Method::POST, url, request).await?)
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, url: &str, token: &str, body: &Value) -> OperationResult<Value> {
        let request = self.client.put(url).bearer_auth(token).json(body);
        parse_json(self.send(Method::PUT, url, request).await?)
    }

    /// Make a PATCH request with a JSON body
    pub async fn patch(&self, url: &str, token: &str, body: &Value) -> OperationResult<Value> {
        let request = self.client.patch(url).bearer_auth(token).json(body);
        parse_json(self.send(Method::PATCH, url, request).await?)
    }

    /// Make a DELETE request to a GCP API
    pub async fn delete(&self, url: &str, token: &str) -> OperationResult<Value> {
        let request = self.client.delete(url).bearer_auth(token);
        parse_json(self.send(Method::DELETE, url, request).await?)
    }

    /// Download a raw response body (media downloads)
    pub async fn get_bytes(&self, url: &str, token: &str) -> OperationResult<Vec<u8>> {
        let request = self.client.get(url).bearer_auth(token);
        self.send(Method::GET, url, request).await
    }

    /// Upload a raw body (media uploads), returning the JSON response
    pub async fn post_bytes(
        &self,
        url: &str,
        token: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> OperationResult<Value> {
        let request = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body);
        parse_json(self.send(Method::POST, url, request).await?)
    }

    async fn send(&self, method: Method, url: &str, request: RequestBuilder) -> OperationResult<Vec<u8>> {
        tracing::debug!("{} {}", method, url);

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            return Err(ApiError::from_response(status, &text));
        }

        Ok(body.to_vec())
    }
}

fn parse_json(body: Vec<u8>) -> OperationResult<Value> {
    // Handle empty response
    if body.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&body)
        .map_err(|e| ApiError::Unknown(format!("Failed to parse response JSON: {}", e)))
}
