//! In-memory Firestore for tests

use super::{Document, FirestoreApi};
use crate::gcp::{ApiError, OperationResult};
use crate::resource::{Page, ProjectContext};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Documents keyed by `(collection, id)`; IDs are assigned sequentially and
/// listings are served two documents per page.
#[derive(Default)]
pub struct FakeFirestore {
    documents: Mutex<BTreeMap<(String, String), Map<String, Value>>>,
    next_id: AtomicUsize,
    failure: Option<ApiError>,
    calls: AtomicUsize,
}

impl FakeFirestore {
    const PAGE_SIZE: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fields(&self, collection: &str, id: &str) -> Option<Map<String, Value>> {
        self.documents
            .lock()
            .unwrap()
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    fn enter(&self) -> OperationResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn document(project: &ProjectContext, collection: &str, id: &str, fields: Map<String, Value>) -> Document {
        Document {
            name: format!(
                "projects/{}/databases/(default)/documents/{}/{}",
                project.project_id(),
                collection,
                id
            ),
            id: id.to_string(),
            fields,
            create_time: "2024-01-01T00:00:00Z".to_string(),
            update_time: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn missing(collection: &str, id: &str) -> ApiError {
        ApiError::NotFound(format!("No document to update: {}/{}", collection, id))
    }
}

#[async_trait]
impl FirestoreApi for FakeFirestore {
    async fn create_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        fields: &Map<String, Value>,
    ) -> OperationResult<Document> {
        self.enter()?;
        let id = format!("doc{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.documents
            .lock()
            .unwrap()
            .insert((collection.to_string(), id.clone()), fields.clone());
        Ok(Self::document(project, collection, &id, fields.clone()))
    }

    async fn get_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        id: &str,
    ) -> OperationResult<Document> {
        self.enter()?;
        let fields = self.fields(collection, id).ok_or_else(|| Self::missing(collection, id))?;
        Ok(Self::document(project, collection, id, fields))
    }

    async fn list_documents(
        &self,
        project: &ProjectContext,
        collection: &str,
        page_token: Option<String>,
    ) -> OperationResult<Page<Document>> {
        self.enter()?;
        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let all: Vec<Document> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|((_, id), fields)| Self::document(project, collection, id, fields.clone()))
            .collect();
        let end = (start + Self::PAGE_SIZE).min(all.len());
        let next = (end < all.len()).then(|| end.to_string());
        Ok(Page::new(all[start.min(end)..end].to_vec(), next))
    }

    async fn update_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> OperationResult<Document> {
        self.enter()?;
        let mut documents = self.documents.lock().unwrap();
        let stored = documents
            .get_mut(&(collection.to_string(), id.to_string()))
            .ok_or_else(|| Self::missing(collection, id))?;
        for (key, value) in fields {
            stored.insert(key.clone(), value.clone());
        }
        Ok(Self::document(project, collection, id, stored.clone()))
    }

    async fn delete_document(
        &self,
        _project: &ProjectContext,
        collection: &str,
        id: &str,
    ) -> OperationResult<()> {
        self.enter()?;
        self.documents
            .lock()
            .unwrap()
            .remove(&(collection.to_string(), id.to_string()));
        Ok(())
    }
}
