//! Firestore documents
//!
//! Documents in the `(default)` database, addressed by collection and ID.

pub mod menu;
pub mod operations;
pub mod value;

#[cfg(test)]
pub(crate) mod fake;

use crate::gcp::client::add_query_params;
use crate::gcp::{ApiError, GcpClient, OperationResult};
use crate::resource::{short_name, Page, ProjectContext};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use value::FirestoreValueError;

/// A document with its fields decoded to plain JSON
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Full resource name
    pub name: String,
    pub id: String,
    pub fields: Map<String, Value>,
    pub create_time: String,
    pub update_time: String,
}

impl Document {
    pub fn fields_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl From<FirestoreValueError> for ApiError {
    fn from(e: FirestoreValueError) -> Self {
        ApiError::Unknown(format!("Unexpected Firestore value: {}", e))
    }
}

/// Remote Firestore API
#[async_trait]
pub trait FirestoreApi: Send + Sync {
    /// Create a document with a server-assigned ID
    async fn create_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        fields: &Map<String, Value>,
    ) -> OperationResult<Document>;

    async fn get_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        id: &str,
    ) -> OperationResult<Document>;

    async fn list_documents(
        &self,
        project: &ProjectContext,
        collection: &str,
        page_token: Option<String>,
    ) -> OperationResult<Page<Document>>;

    /// Overwrite the given fields only; the document must exist
    async fn update_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> OperationResult<Document>;

    async fn delete_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        id: &str,
    ) -> OperationResult<()>;
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireDocument {
    name: String,
    fields: Option<Value>,
    create_time: String,
    update_time: String,
}

impl TryFrom<WireDocument> for Document {
    type Error = FirestoreValueError;

    fn try_from(wire: WireDocument) -> Result<Self, Self::Error> {
        let fields = match &wire.fields {
            Some(fields) => value::decode_fields(fields)?,
            None => Map::new(),
        };
        Ok(Self {
            id: short_name(&wire.name).to_string(),
            name: wire.name,
            fields,
            create_time: wire.create_time,
            update_time: wire.update_time,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentsPage {
    #[serde(default)]
    documents: Vec<WireDocument>,
    next_page_token: Option<String>,
}

fn decode_document(value: Value) -> OperationResult<Document> {
    let wire: WireDocument = serde_json::from_value(value)
        .map_err(|e| ApiError::Unknown(format!("Unexpected Firestore response: {}", e)))?;
    Ok(Document::try_from(wire)?)
}

/// Field paths for an update mask; keys that are not simple identifiers are quoted
pub fn field_paths(fields: &Map<String, Value>) -> Vec<String> {
    fields
        .keys()
        .map(|key| {
            let simple = key
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if simple {
                key.clone()
            } else {
                format!("`{}`", key.replace('\\', "\\\\").replace('`', "\\`"))
            }
        })
        .collect()
}

#[async_trait]
impl FirestoreApi for GcpClient {
    async fn create_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        fields: &Map<String, Value>,
    ) -> OperationResult<Document> {
        let url = self.firestore_documents_url(project.project_id(), collection);
        let body = json!({ "fields": value::encode_fields(fields) });
        decode_document(self.post(&url, Some(&body)).await?)
    }

    async fn get_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        id: &str,
    ) -> OperationResult<Document> {
        let url = self.firestore_documents_url(project.project_id(), &format!("{}/{}", collection, id));
        decode_document(self.get(&url).await?)
    }

    async fn list_documents(
        &self,
        project: &ProjectContext,
        collection: &str,
        page_token: Option<String>,
    ) -> OperationResult<Page<Document>> {
        let url = add_query_params(
            &self.firestore_documents_url(project.project_id(), collection),
            &[("pageToken", page_token.as_deref())],
        )?;
        let page: DocumentsPage = serde_json::from_value(self.get(&url).await?)
            .map_err(|e| ApiError::Unknown(format!("Unexpected Firestore response: {}", e)))?;
        let documents = page
            .documents
            .into_iter()
            .map(Document::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(documents, page.next_page_token))
    }

    async fn update_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> OperationResult<Document> {
        // Without a mask the PATCH would replace the whole document
        if fields.is_empty() {
            return Err(ApiError::Unknown("No fields to update".into()));
        }
        let paths = field_paths(fields);
        let mut params: Vec<(&str, Option<&str>)> = paths
            .iter()
            .map(|path| ("updateMask.fieldPaths", Some(path.as_str())))
            .collect();
        params.push(("currentDocument.exists", Some("true")));

        let url = add_query_params(
            &self.firestore_documents_url(project.project_id(), &format!("{}/{}", collection, id)),
            &params,
        )?;
        let body = json!({ "fields": value::encode_fields(fields) });
        decode_document(self.patch(&url, &body).await?)
    }

    async fn delete_document(
        &self,
        project: &ProjectContext,
        collection: &str,
        id: &str,
    ) -> OperationResult<()> {
        let url = self.firestore_documents_url(project.project_id(), &format!("{}/{}", collection, id));
        self.delete(&url).await?;
        Ok(())
    }
}
