//! Interactive Firestore menu
//!
//! Works on one collection, chosen from configuration at startup.

use super::{operations, FirestoreApi};
use crate::menu::{Dispatch, Field, Menu, MenuEntry};
use crate::resource::ProjectContext;
use crate::ui::Console;
use async_trait::async_trait;
use std::io::Write;

/// Collection used when `FIRESTORE_COLLECTION` is not set
pub const DEFAULT_COLLECTION: &str = "experiments";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirestoreCommand {
    Add(String),
    Get(String),
    List,
    Update { id: String, updates: String },
    Delete(String),
}

pub static FIRESTORE_MENU: Menu<FirestoreCommand> = Menu {
    title: "FIRESTORE MENU",
    entries: &[
        MenuEntry {
            label: "Add a document",
            announce: None,
            fields: &[Field::required("document data as JSON")],
            rejection: "Document data cannot be empty",
            build: |mut a| FirestoreCommand::Add(a.text()),
        },
        MenuEntry {
            label: "Get a document",
            announce: None,
            fields: &[Field::required("Document ID")],
            rejection: "Document ID cannot be empty",
            build: |mut a| FirestoreCommand::Get(a.text()),
        },
        MenuEntry {
            label: "List documents",
            announce: Some("📋 Listing documents..."),
            fields: &[],
            rejection: "",
            build: |_| FirestoreCommand::List,
        },
        MenuEntry {
            label: "Update a document",
            announce: None,
            fields: &[
                Field::required("Document ID"),
                Field::required("fields to update as JSON"),
            ],
            rejection: "Document ID and update data cannot be empty",
            build: |mut a| FirestoreCommand::Update {
                id: a.text(),
                updates: a.text(),
            },
        },
        MenuEntry {
            label: "Delete a document",
            announce: None,
            fields: &[Field::required("Document ID")],
            rejection: "Document ID cannot be empty",
            build: |mut a| FirestoreCommand::Delete(a.text()),
        },
    ],
};

pub struct FirestoreHandler<'a> {
    pub api: &'a dyn FirestoreApi,
    pub ctx: &'a ProjectContext,
    pub collection: &'a str,
}

#[async_trait(?Send)]
impl Dispatch<FirestoreCommand> for FirestoreHandler<'_> {
    async fn dispatch<W: Write>(&self, command: FirestoreCommand, console: &mut Console<W>) {
        let (api, ctx, collection) = (self.api, self.ctx, self.collection);
        let _ = match command {
            FirestoreCommand::Add(data) => {
                operations::add_document(api, ctx, console, collection, &data).await.map(drop)
            }
            FirestoreCommand::Get(id) => {
                operations::get_document(api, ctx, console, collection, &id).await.map(drop)
            }
            FirestoreCommand::List => {
                operations::list_documents(api, ctx, console, collection).await.map(drop)
            }
            FirestoreCommand::Update { id, updates } => {
                operations::update_document(api, ctx, console, collection, &id, &updates)
                    .await
                    .map(drop)
            }
            FirestoreCommand::Delete(id) => {
                operations::delete_document(api, ctx, console, collection, &id).await
            }
        };
    }
}
