//! Interactive Cloud Storage menu

use super::{operations, StorageApi};
use crate::menu::{Dispatch, Field, Menu, MenuEntry};
use crate::resource::ProjectContext;
use crate::ui::Console;
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCommand {
    ListBuckets,
    CreateBucket(String),
    Upload {
        bucket: String,
        source_file: PathBuf,
        object: String,
    },
    Download {
        bucket: String,
        object: String,
        destination_file: PathBuf,
    },
}

pub static STORAGE_MENU: Menu<StorageCommand> = Menu {
    title: "CLOUD STORAGE MENU",
    entries: &[
        MenuEntry {
            label: "List buckets",
            announce: Some("📋 Listing buckets..."),
            fields: &[],
            rejection: "",
            build: |_| StorageCommand::ListBuckets,
        },
        MenuEntry {
            label: "Create a bucket",
            announce: None,
            fields: &[Field::required("Bucket Name")],
            rejection: "Bucket name cannot be empty",
            build: |mut a| StorageCommand::CreateBucket(a.text()),
        },
        MenuEntry {
            label: "Upload a file",
            announce: None,
            fields: &[
                Field::required("Bucket Name"),
                Field::required("local file path"),
                Field::required("Object Name"),
            ],
            rejection: "Bucket name, file path and object name cannot be empty",
            build: |mut a| StorageCommand::Upload {
                bucket: a.text(),
                source_file: PathBuf::from(a.text()),
                object: a.text(),
            },
        },
        MenuEntry {
            label: "Download a file",
            announce: None,
            fields: &[
                Field::required("Bucket Name"),
                Field::required("Object Name"),
                Field::required("destination file path"),
            ],
            rejection: "Bucket name, object name and file path cannot be empty",
            build: |mut a| StorageCommand::Download {
                bucket: a.text(),
                object: a.text(),
                destination_file: PathBuf::from(a.text()),
            },
        },
    ],
};

pub struct StorageHandler<'a> {
    pub api: &'a dyn StorageApi,
    pub ctx: &'a ProjectContext,
}

#[async_trait(?Send)]
impl Dispatch<StorageCommand> for StorageHandler<'_> {
    async fn dispatch<W: Write>(&self, command: StorageCommand, console: &mut Console<W>) {
        let (api, ctx) = (self.api, self.ctx);
        let _ = match command {
            StorageCommand::ListBuckets => operations::list_buckets(api, ctx, console).await.map(drop),
            StorageCommand::CreateBucket(name) => {
                operations::create_bucket(api, ctx, console, &name).await.map(drop)
            }
            StorageCommand::Upload {
                bucket,
                source_file,
                object,
            } => operations::upload_file(api, console, &bucket, &source_file, &object)
                .await
                .map(drop),
            StorageCommand::Download {
                bucket,
                object,
                destination_file,
            } => operations::download_file(api, console, &bucket, &object, &destination_file)
                .await
                .map(drop),
        };
    }
}
