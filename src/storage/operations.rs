//! Cloud Storage operations

use super::{Bucket, StorageApi, StoredObject, DEFAULT_BUCKET_LOCATION};
use crate::resource::{for_each_item, require, OpError, OpResult, ProjectContext};
use crate::ui::{Console, ErrorReport};
use std::io::Write;
use std::path::Path;

/// Content type sent with uploads
const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

pub async fn list_buckets<W: Write>(
    api: &dyn StorageApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
) -> OpResult<usize> {
    console.notice(format!("Buckets in project {}:", ctx.project_id()));

    let listed = for_each_item(
        |token| api.list_buckets(ctx, token),
        |_, bucket: Bucket| console.line(format!("  - {} ({})", bucket.name, bucket.location)),
    )
    .await;

    match listed {
        Ok(0) => {
            console.line("  (no buckets)");
            Ok(0)
        }
        Ok(count) => {
            console.notice(format!("Total Buckets Found: {}", count));
            Ok(count)
        }
        Err(e) => {
            let report = ErrorReport::new("listing buckets").permission("storage.buckets.list");
            report.fail(console, e)
        }
    }
}

pub async fn create_bucket<W: Write>(
    api: &dyn StorageApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    bucket_name: &str,
) -> OpResult<Bucket> {
    let bucket_name = require(console, "Bucket name", bucket_name)?;

    match api.create_bucket(ctx, bucket_name, DEFAULT_BUCKET_LOCATION).await {
        Ok(bucket) => {
            tracing::info!(bucket = %bucket.name, location = %bucket.location, "Bucket created");
            console.success(format!("Bucket '{}' created successfully.", bucket.name));
            Ok(bucket)
        }
        Err(e) => {
            let report = ErrorReport::new("creating bucket")
                .permission("storage.buckets.create")
                .already_exists("Bucket", bucket_name);
            report.fail(console, e)
        }
    }
}

/// Upload a local file as `object`
pub async fn upload_file<W: Write>(
    api: &dyn StorageApi,
    console: &mut Console<W>,
    bucket: &str,
    source_file: &Path,
    object: &str,
) -> OpResult<StoredObject> {
    let bucket = require(console, "Bucket name", bucket)?;
    let object = require(console, "Object name", object)?;

    let data = match tokio::fs::read(source_file).await {
        Ok(data) => data,
        Err(e) => {
            let error = OpError::Local(format!("Cannot read {}: {}", source_file.display(), e));
            console.failure(&error);
            return Err(error);
        }
    };

    match api.upload_object(bucket, object, UPLOAD_CONTENT_TYPE, data).await {
        Ok(stored) => {
            tracing::info!(bucket, object, size = %stored.size, "Object uploaded");
            console.success(format!(
                "File {} uploaded to {} in bucket {}",
                source_file.display(),
                object,
                bucket
            ));
            Ok(stored)
        }
        Err(e) => {
            let report = ErrorReport::new("uploading file")
                .permission("storage.objects.create")
                .not_found("Bucket", bucket);
            report.fail(console, e)
        }
    }
}

/// Download `object` into a local file, returning the byte count
pub async fn download_file<W: Write>(
    api: &dyn StorageApi,
    console: &mut Console<W>,
    bucket: &str,
    object: &str,
    destination_file: &Path,
) -> OpResult<usize> {
    let bucket = require(console, "Bucket name", bucket)?;
    let object = require(console, "Object name", object)?;

    let data = match api.download_object(bucket, object).await {
        Ok(data) => data,
        Err(e) => {
            let report = ErrorReport::new("downloading file")
                .permission("storage.objects.get")
                .not_found("Object", object);
            return report.fail(console, e);
        }
    };

    if let Err(e) = tokio::fs::write(destination_file, &data).await {
        let error = OpError::Local(format!("Cannot write {}: {}", destination_file.display(), e));
        console.failure(&error);
        return Err(error);
    }

    tracing::info!(bucket, object, bytes = data.len(), "Object downloaded");
    console.success(format!(
        "Blob {} downloaded to {}",
        object,
        destination_file.display()
    ));
    Ok(data.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcp::ApiError;
    use crate::storage::fake::FakeStorage;
    use crate::ui::console::{captured, output};

    fn ctx() -> ProjectContext {
        ProjectContext::new("demo-proj")
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let api = FakeStorage::new();
        let mut console = captured();

        create_bucket(&api, &ctx(), &mut console, "test-cloud-code").await.unwrap();
        let count = list_buckets(&api, &ctx(), &mut console).await.unwrap();

        assert_eq!(count, 1);
        let text = output(console);
        assert!(text.contains("Bucket 'test-cloud-code' created successfully."));
        assert!(text.contains("  - test-cloud-code (US)"));
    }

    #[tokio::test]
    async fn test_list_permission_denied() {
        let api = FakeStorage::failing(ApiError::PermissionDenied("no access".into()));
        let mut console = captured();

        let result = list_buckets(&api, &ctx(), &mut console).await;

        assert!(result.is_err());
        let text = output(console);
        assert!(text.contains("Permission Denied: no access"));
        assert!(text.contains("'storage.buckets.list'"));
    }

    #[tokio::test]
    async fn test_existing_bucket_conflict() {
        let api = FakeStorage::new().with_bucket("taken");
        let mut console = captured();

        let result = create_bucket(&api, &ctx(), &mut console, "taken").await;

        assert!(matches!(result, Err(OpError::Api(ApiError::AlreadyExists(_)))));
        assert!(output(console).contains("Bucket 'taken' already exists"));
    }

    #[tokio::test]
    async fn test_upload_and_download_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("local_file.txt");
        let target = dir.path().join("downloaded_file.txt");
        std::fs::write(&source, b"payload").unwrap();

        let api = FakeStorage::new().with_bucket("data");
        let mut console = captured();

        let stored = upload_file(&api, &mut console, "data", &source, "uploaded_file.txt")
            .await
            .unwrap();
        assert_eq!(stored.size, "7");

        let bytes = download_file(&api, &mut console, "data", "uploaded_file.txt", &target)
            .await
            .unwrap();
        assert_eq!(bytes, 7);
        assert_eq!(std::fs::read(&target).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_missing_source_file_makes_no_call() {
        let api = FakeStorage::new().with_bucket("data");
        let mut console = captured();

        let result = upload_file(&api, &mut console, "data", Path::new("/nonexistent/file"), "x").await;

        assert!(matches!(result, Err(OpError::Local(_))));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_download_missing_object() {
        let api = FakeStorage::new().with_bucket("data");
        let mut console = captured();

        let result = download_file(&api, &mut console, "data", "nope", Path::new("out")).await;

        assert!(matches!(result, Err(OpError::Api(ApiError::NotFound(_)))));
        assert!(output(console).contains("Object 'nope' not found"));
    }
}
