//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication
//! and HTTP functionality. One client is built per process and shared by
//! every API surface.

use super::auth::GcpCredentials;
use super::error::{ApiError, OperationResult};
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;

/// Environment variable replacing every service base URL (emulators)
pub const API_ENDPOINT_ENV: &str = "GCPKIT_API_ENDPOINT";

/// Base URLs for each API surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub pubsub: String,
    pub resource_manager: String,
    pub storage: String,
    pub firestore: String,
    pub secret_manager: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            pubsub: "https://pubsub.googleapis.com".to_string(),
            resource_manager: "https://cloudresourcemanager.googleapis.com".to_string(),
            storage: "https://storage.googleapis.com".to_string(),
            firestore: "https://firestore.googleapis.com".to_string(),
            secret_manager: "https://secretmanager.googleapis.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Route every service to the same base URL
    pub fn single(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            pubsub: base.clone(),
            resource_manager: base.clone(),
            storage: base.clone(),
            firestore: base.clone(),
            secret_manager: base,
        }
    }

    /// Defaults, unless `GCPKIT_API_ENDPOINT` points somewhere else
    pub fn from_env() -> Self {
        match std::env::var(API_ENDPOINT_ENV) {
            Ok(base) if !base.trim().is_empty() => {
                tracing::info!("Routing API calls to {}", base);
                Self::single(base.trim())
            }
            _ => Self::default(),
        }
    }
}

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub endpoints: Endpoints,
}

impl GcpClient {
    /// Create a new GCP client from ambient credentials
    pub async fn new() -> Result<Self> {
        let credentials = GcpCredentials::new()
            .await
            .context("Failed to initialize GCP credentials")?;

        Self::with_credentials(credentials, Endpoints::from_env())
    }

    /// Create a client with explicit credentials and endpoints
    pub fn with_credentials(credentials: GcpCredentials, endpoints: Endpoints) -> Result<Self> {
        let http = GcpHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            endpoints,
        })
    }

    async fn token(&self) -> OperationResult<String> {
        self.credentials.get_token().await.map_err(ApiError::from)
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> OperationResult<Value> {
        let token = self.token().await?;
        self.http.get(url, &token).await
    }

    /// Make a POST request to a GCP API
    pub async fn post(&self, url: &str, body: Option<&Value>) -> OperationResult<Value> {
        let token = self.token().await?;
        self.http.post(url, &token, body).await
    }

    /// Make a PUT request to a GCP API
    pub async fn put(&self, url: &str, body: &Value) -> OperationResult<Value> {
        let token = self.token().await?;
        self.http.put(url, &token, body).await
    }

    /// Make a PATCH request to a GCP API
    pub async fn patch(&self, url: &str, body: &Value) -> OperationResult<Value> {
        let token = self.token().await?;
        self.http.patch(url, &token, body).await
    }

    /// Make a DELETE request to a GCP API
    pub async fn delete(&self, url: &str) -> OperationResult<Value> {
        let token = self.token().await?;
        self.http.delete(url, &token).await
    }

    /// Download raw bytes
    pub async fn get_bytes(&self, url: &str) -> OperationResult<Vec<u8>> {
        let token = self.token().await?;
        self.http.get_bytes(url, &token).await
    }

    /// Upload raw bytes
    pub async fn post_bytes(&self, url: &str, content_type: &str, body: Vec<u8>) -> OperationResult<Value> {
        let token = self.token().await?;
        self.http.post_bytes(url, &token, content_type, body).await
    }

    // =========================================================================
    // Pub/Sub API helpers
    // =========================================================================

    /// Build Pub/Sub API URL for a resource path
    pub fn pubsub_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.endpoints.pubsub, encode_path(path))
    }

    // =========================================================================
    // Resource Manager API helpers
    // =========================================================================

    /// Build Resource Manager v3 API URL
    pub fn resourcemanager_url(&self, path: &str) -> String {
        format!("{}/v3/{}", self.endpoints.resource_manager, encode_path(path))
    }

    // =========================================================================
    // Cloud Storage API helpers
    // =========================================================================

    /// Build Cloud Storage JSON API URL
    pub fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.endpoints.storage, path)
    }

    /// Build Cloud Storage bucket URL
    pub fn storage_bucket_url(&self, bucket: &str) -> String {
        self.storage_url(&format!("b/{}", urlencoding::encode(bucket)))
    }

    /// Build Cloud Storage object URL
    pub fn storage_object_url(&self, bucket: &str, object: &str) -> String {
        format!(
            "{}/o/{}",
            self.storage_bucket_url(bucket),
            urlencoding::encode(object)
        )
    }

    /// Build Cloud Storage media upload URL
    pub fn storage_upload_url(&self, bucket: &str, object: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.endpoints.storage,
            urlencoding::encode(bucket),
            urlencoding::encode(object)
        )
    }

    // =========================================================================
    // Firestore API helpers
    // =========================================================================

    /// Build Firestore documents URL for the default database
    pub fn firestore_documents_url(&self, project_id: &str, path: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.endpoints.firestore,
            urlencoding::encode(project_id),
            encode_path(path)
        )
    }

    // =========================================================================
    // Secret Manager API helpers
    // =========================================================================

    /// Build Secret Manager API URL
    pub fn secretmanager_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.endpoints.secret_manager, encode_path(path))
    }
}

/// Percent-encode each `/`-separated segment of a resource path.
///
/// Custom methods (`:publish`, `:access`) must be appended after encoding.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Append URL-encoded query parameters, skipping `None` values
pub fn add_query_params(url: &str, params: &[(&str, Option<&str>)]) -> OperationResult<String> {
    let mut parsed = url::Url::parse(url)
        .map_err(|e| ApiError::Unknown(format!("Invalid URL {}: {}", url, e)))?;
    {
        let mut pairs = parsed.query_pairs_mut();
        for (key, value) in params {
            if let Some(value) = value {
                pairs.append_pair(key, value);
            }
        }
    }
    // An empty query_pairs_mut() leaves a dangling '?'
    if parsed.query() == Some("") {
        parsed.set_query(None);
    }
    Ok(parsed.to_string())
}
