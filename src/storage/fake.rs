//! In-memory Cloud Storage for tests

use super::{Bucket, StorageApi, StoredObject};
use crate::gcp::{ApiError, OperationResult};
use crate::resource::{Page, ProjectContext};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeStorage {
    buckets: Mutex<BTreeMap<String, Bucket>>,
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    failure: Option<ApiError>,
    calls: AtomicUsize,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn with_bucket(self, name: &str) -> Self {
        self.buckets.lock().unwrap().insert(
            name.to_string(),
            Bucket {
                name: name.to_string(),
                location: "US".to_string(),
                time_created: "2024-01-01T00:00:00Z".to_string(),
            },
        );
        self
    }

    pub fn with_object(self, bucket: &str, name: &str, data: &[u8]) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), name.to_string()), data.to_vec());
        self
    }

    pub fn object(&self, bucket: &str, name: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), name.to_string()))
            .cloned()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> OperationResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn stored(bucket: &str, name: &str, data: &[u8]) -> StoredObject {
        StoredObject {
            bucket: bucket.to_string(),
            name: name.to_string(),
            size: data.len().to_string(),
            content_type: "application/octet-stream".to_string(),
        }
    }
}

#[async_trait]
impl StorageApi for FakeStorage {
    async fn list_buckets(
        &self,
        _project: &ProjectContext,
        _page_token: Option<String>,
    ) -> OperationResult<Page<Bucket>> {
        self.enter()?;
        let buckets = self.buckets.lock().unwrap().values().cloned().collect();
        Ok(Page::last(buckets))
    }

    async fn create_bucket(
        &self,
        _project: &ProjectContext,
        name: &str,
        location: &str,
    ) -> OperationResult<Bucket> {
        self.enter()?;
        let mut buckets = self.buckets.lock().unwrap();
        if buckets.contains_key(name) {
            return Err(ApiError::AlreadyExists(
                "Your previous request to create the named bucket succeeded and you already own it."
                    .into(),
            ));
        }
        let bucket = Bucket {
            name: name.to_string(),
            location: location.to_string(),
            time_created: "2024-01-01T00:00:00Z".to_string(),
        };
        buckets.insert(name.to_string(), bucket.clone());
        Ok(bucket)
    }

    async fn upload_object(
        &self,
        bucket: &str,
        object: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> OperationResult<StoredObject> {
        self.enter()?;
        if !self.buckets.lock().unwrap().contains_key(bucket) {
            return Err(ApiError::NotFound("The specified bucket does not exist.".into()));
        }
        let stored = Self::stored(bucket, object, &data);
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), object.to_string()), data);
        Ok(stored)
    }

    async fn download_object(&self, bucket: &str, object: &str) -> OperationResult<Vec<u8>> {
        self.enter()?;
        self.object(bucket, object)
            .ok_or_else(|| ApiError::NotFound("No such object".into()))
    }

    async fn copy_object(
        &self,
        source_bucket: &str,
        object: &str,
        destination_bucket: &str,
    ) -> OperationResult<StoredObject> {
        self.enter()?;
        let data = self
            .object(source_bucket, object)
            .ok_or_else(|| ApiError::NotFound("No such object".into()))?;
        let stored = Self::stored(destination_bucket, object, &data);
        self.objects
            .lock()
            .unwrap()
            .insert((destination_bucket.to_string(), object.to_string()), data);
        Ok(stored)
    }
}
