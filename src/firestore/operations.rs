//! Firestore document operations

use super::{Document, FirestoreApi};
use crate::gcp::ApiError;
use crate::resource::{for_each_item, require, OpError, OpResult, ProjectContext};
use crate::ui::{Console, ErrorReport};
use serde_json::{Map, Value};
use std::io::Write;

/// Parse user-supplied document data, which must be a JSON object
pub fn parse_fields(text: &str) -> OpResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(OpError::Local("Document data must be a JSON object".into())),
        Err(e) => Err(OpError::Local(format!("Invalid JSON: {}", e))),
    }
}

fn parse_or_report<W: Write>(console: &mut Console<W>, text: &str) -> OpResult<Map<String, Value>> {
    parse_fields(text).inspect_err(|e| console.failure(e))
}

fn compact(document: &Document) -> String {
    document.fields_json().to_string()
}

pub async fn add_document<W: Write>(
    api: &dyn FirestoreApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    collection: &str,
    data: &str,
) -> OpResult<Document> {
    let collection = require(console, "Collection name", collection)?;
    let fields = parse_or_report(console, data)?;

    match api.create_document(ctx, collection, &fields).await {
        Ok(document) => {
            tracing::info!(collection, id = %document.id, "Document added");
            console.success(format!("Document added with ID: {}", document.id));
            Ok(document)
        }
        Err(e) => {
            let report = ErrorReport::new("adding document").permission("datastore.entities.create");
            report.fail(console, e)
        }
    }
}

/// Print a document; a missing document is reported, not treated as failure
pub async fn get_document<W: Write>(
    api: &dyn FirestoreApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    collection: &str,
    id: &str,
) -> OpResult<Option<Document>> {
    let collection = require(console, "Collection name", collection)?;
    let id = require(console, "Document ID", id)?;

    match api.get_document(ctx, collection, id).await {
        Ok(document) => {
            console.line(format!("Document data: {}", compact(&document)));
            Ok(Some(document))
        }
        Err(ApiError::NotFound(_)) => {
            console.line("Document does not exist");
            Ok(None)
        }
        Err(e) => {
            let report = ErrorReport::new("getting document").permission("datastore.entities.get");
            report.fail(console, e)
        }
    }
}

pub async fn list_documents<W: Write>(
    api: &dyn FirestoreApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    collection: &str,
) -> OpResult<usize> {
    let collection = require(console, "Collection name", collection)?;
    console.line(format!("Documents in collection '{}':", collection));

    let listed = for_each_item(
        |token| api.list_documents(ctx, collection, token),
        |_, document: Document| console.line(format!("  {} => {}", document.id, compact(&document))),
    )
    .await;

    match listed {
        Ok(0) => {
            console.line("No documents found.");
            Ok(0)
        }
        Ok(count) => {
            console.notice(format!("Total Documents Found: {}", count));
            Ok(count)
        }
        Err(e) => {
            let report = ErrorReport::new("listing documents").permission("datastore.entities.list");
            report.fail(console, e)
        }
    }
}

pub async fn update_document<W: Write>(
    api: &dyn FirestoreApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    collection: &str,
    id: &str,
    updates: &str,
) -> OpResult<Document> {
    let collection = require(console, "Collection name", collection)?;
    let id = require(console, "Document ID", id)?;
    let fields = parse_or_report(console, updates)?;
    if fields.is_empty() {
        let error = OpError::Local("No fields to update".into());
        console.failure(&error);
        return Err(error);
    }

    match api.update_document(ctx, collection, id, &fields).await {
        Ok(document) => {
            tracing::info!(collection, id, fields = fields.len(), "Document updated");
            console.success(format!("Document {} updated successfully", id));
            Ok(document)
        }
        Err(e) => {
            let report = ErrorReport::new("updating document")
                .permission("datastore.entities.update")
                .not_found("Document", id);
            report.fail(console, e)
        }
    }
}

pub async fn delete_document<W: Write>(
    api: &dyn FirestoreApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    collection: &str,
    id: &str,
) -> OpResult<()> {
    let collection = require(console, "Collection name", collection)?;
    let id = require(console, "Document ID", id)?;

    match api.delete_document(ctx, collection, id).await {
        Ok(()) => {
            tracing::info!(collection, id, "Document deleted");
            console.success(format!("Document {} deleted successfully", id));
            Ok(())
        }
        Err(e) => {
            let report = ErrorReport::new("deleting document").permission("datastore.entities.delete");
            report.fail(console, e)
        }
    }
}
