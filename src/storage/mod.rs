//! Cloud Storage
//!
//! Buckets and objects through the JSON API.

pub mod menu;
pub mod operations;

#[cfg(test)]
pub(crate) mod fake;

use crate::gcp::client::add_query_params;
use crate::gcp::{ApiError, GcpClient, OperationResult};
use crate::resource::{Page, ProjectContext};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Location used when creating buckets
pub const DEFAULT_BUCKET_LOCATION: &str = "US";

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bucket {
    pub name: String,
    pub location: String,
    pub time_created: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredObject {
    pub bucket: String,
    pub name: String,
    /// Decimal string, as sent by the API
    pub size: String,
    pub content_type: String,
}

/// Remote Cloud Storage API
#[async_trait]
pub trait StorageApi: Send + Sync {
    async fn list_buckets(
        &self,
        project: &ProjectContext,
        page_token: Option<String>,
    ) -> OperationResult<Page<Bucket>>;

    async fn create_bucket(
        &self,
        project: &ProjectContext,
        name: &str,
        location: &str,
    ) -> OperationResult<Bucket>;

    async fn upload_object(
        &self,
        bucket: &str,
        object: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> OperationResult<StoredObject>;

    async fn download_object(&self, bucket: &str, object: &str) -> OperationResult<Vec<u8>>;

    /// Server-side copy, keeping the object name
    async fn copy_object(
        &self,
        source_bucket: &str,
        object: &str,
        destination_bucket: &str,
    ) -> OperationResult<StoredObject>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BucketsPage {
    #[serde(default)]
    items: Vec<Bucket>,
    next_page_token: Option<String>,
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> OperationResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Unknown(format!("Unexpected Cloud Storage response: {}", e)))
}

#[async_trait]
impl StorageApi for GcpClient {
    async fn list_buckets(
        &self,
        project: &ProjectContext,
        page_token: Option<String>,
    ) -> OperationResult<Page<Bucket>> {
        let url = add_query_params(
            &self.storage_url("b"),
            &[
                ("project", Some(project.project_id())),
                ("pageToken", page_token.as_deref()),
            ],
        )?;
        let page: BucketsPage = decode(self.get(&url).await?)?;
        Ok(Page::new(page.items, page.next_page_token))
    }

    async fn create_bucket(
        &self,
        project: &ProjectContext,
        name: &str,
        location: &str,
    ) -> OperationResult<Bucket> {
        let url = add_query_params(&self.storage_url("b"), &[("project", Some(project.project_id()))])?;
        let body = json!({ "name": name, "location": location });
        decode(self.post(&url, Some(&body)).await?)
    }

    async fn upload_object(
        &self,
        bucket: &str,
        object: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> OperationResult<StoredObject> {
        let url = self.storage_upload_url(bucket, object);
        decode(self.post_bytes(&url, content_type, data).await?)
    }

    async fn download_object(&self, bucket: &str, object: &str) -> OperationResult<Vec<u8>> {
        let url = add_query_params(&self.storage_object_url(bucket, object), &[("alt", Some("media"))])?;
        self.get_bytes(&url).await
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        object: &str,
        destination_bucket: &str,
    ) -> OperationResult<StoredObject> {
        let url = format!(
            "{}/copyTo/b/{}/o/{}",
            self.storage_object_url(source_bucket, object),
            urlencoding::encode(destination_bucket),
            urlencoding::encode(object)
        );
        decode(self.post(&url, None).await?)
    }
}
