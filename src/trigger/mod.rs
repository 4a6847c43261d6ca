//! Storage copy trigger
//!
//! Handles "object finalized" events from Cloud Storage by copying the new
//! object into `DESTINATION_BUCKET`. Events arrive as CloudEvents over HTTP
//! (see [`routes`]) or are replayed once from a JSON file.

pub mod routes;

use crate::storage::StorageApi;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// The parts of a storage event the copy needs
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct StorageEvent {
    pub bucket: String,
    pub name: String,
    /// CloudEvent ID; empty when the event carried none
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("event is missing '{0}'")]
    MissingField(&'static str),
}

impl StorageEvent {
    /// Parse an event body.
    ///
    /// With `ce_id` (binary content mode) the body is the storage object
    /// itself. Otherwise the body is either a structured CloudEvent whose
    /// `data` holds the object, or a bare `{bucket, name, id}` object.
    pub fn parse(body: &[u8], ce_id: Option<&str>) -> Result<Self, EventError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| EventError::InvalidJson(e.to_string()))?;

        let mut event = match (ce_id, value.get("data")) {
            (Some(id), _) => Self {
                id: id.to_string(),
                ..Self::from_object(value)?
            },
            (None, Some(data)) => Self {
                id: value
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                ..Self::from_object(data.clone())?
            },
            (None, None) => Self::from_object(value)?,
        };

        event.bucket = event.bucket.trim().to_string();
        if event.bucket.is_empty() {
            return Err(EventError::MissingField("bucket"));
        }
        if event.name.is_empty() {
            return Err(EventError::MissingField("name"));
        }
        Ok(event)
    }

    fn from_object(value: Value) -> Result<Self, EventError> {
        serde_json::from_value(value).map_err(|e| EventError::InvalidJson(e.to_string()))
    }
}

/// What the trigger did with one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// `DESTINATION_BUCKET` is not configured
    MissingDestination,
    /// Source and destination are the same bucket
    SameBucket,
    Failed(String),
}

/// Resolve where the event's object goes, or why it is skipped.
///
/// Makes no remote call; skips are logged here.
pub fn plan_copy<'a>(
    destination: Option<&'a str>,
    event: &StorageEvent,
) -> Result<&'a str, CopyOutcome> {
    let Some(destination) = destination.map(str::trim).filter(|d| !d.is_empty()) else {
        tracing::error!("DESTINATION_BUCKET environment variable not set.");
        return Err(CopyOutcome::MissingDestination);
    };

    // Copying into the watched bucket would trigger us again
    if event.bucket == destination {
        tracing::warn!(
            "Source and destination are the same ({}). Skipping.",
            event.bucket
        );
        return Err(CopyOutcome::SameBucket);
    }

    Ok(destination)
}

/// Copy the event's object to a destination returned by [`plan_copy`].
/// Every result is logged.
pub async fn copy_to(
    storage: &dyn StorageApi,
    destination: &str,
    event: &StorageEvent,
) -> CopyOutcome {
    tracing::info!("Processing file: {} from bucket: {}", event.name, event.bucket);

    match storage
        .copy_object(&event.bucket, &event.name, destination)
        .await
    {
        Ok(_) => {
            tracing::info!(
                file_name = %event.name,
                source_bucket = %event.bucket,
                dest_bucket = %destination,
                event_id = %event.id,
                "File copy successful"
            );
            CopyOutcome::Copied
        }
        Err(e) => {
            tracing::error!(
                file_name = %event.name,
                source_bucket = %event.bucket,
                dest_bucket = %destination,
                error = ?e,
                "Error copying file {}: {}",
                event.name,
                e
            );
            CopyOutcome::Failed(e.to_string())
        }
    }
}
