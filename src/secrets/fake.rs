//! In-memory Secret Manager and key verifier for tests

use super::{KeyVerifier, SecretsApi};
use crate::gcp::{ApiError, OperationResult};
use crate::projects::Project;
use crate::resource::ResourceRef;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeSecrets {
    versions: BTreeMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl FakeSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, version_path: &str, payload: &str) -> Self {
        self.versions
            .insert(version_path.to_string(), payload.as_bytes().to_vec());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretsApi for FakeSecrets {
    async fn access_secret_version(&self, version_path: &str) -> OperationResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.versions.get(version_path).cloned().ok_or_else(|| {
            ApiError::NotFound(format!("Secret [{}] not found or has no versions.", version_path))
        })
    }
}

/// Accepts or rejects every key, remembering what it was given
#[derive(Default)]
pub struct FakeVerifier {
    failure: Option<ApiError>,
    keys: Mutex<Vec<String>>,
}

impl FakeVerifier {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn rejecting(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyVerifier for FakeVerifier {
    async fn verify_key(&self, key_json: &str, project: &ResourceRef) -> OperationResult<Project> {
        self.keys.lock().unwrap().push(key_json.to_string());
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(Project {
                name: "projects/1000".to_string(),
                project_id: project.name().to_string(),
                state: "ACTIVE".to_string(),
                ..Project::default()
            }),
        }
    }
}
