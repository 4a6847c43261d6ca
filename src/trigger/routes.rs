//! HTTP endpoint receiving storage CloudEvents

use super::{copy_to, plan_copy, CopyOutcome, StorageEvent};
use crate::gcp::GcpClient;
use crate::storage::StorageApi;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Header carrying the event ID in binary content mode
pub const CE_ID_HEADER: &str = "ce-id";

/// Builds the storage client the first time an event needs a copy
#[async_trait]
pub trait StorageConnector: Send + Sync {
    async fn connect(&self) -> anyhow::Result<Arc<dyn StorageApi>>;
}

/// Connects with the ambient credentials
pub struct AmbientStorage;

#[async_trait]
impl StorageConnector for AmbientStorage {
    async fn connect(&self) -> anyhow::Result<Arc<dyn StorageApi>> {
        Ok(Arc::new(GcpClient::new().await?))
    }
}

#[derive(Clone)]
pub struct CopyTrigger {
    connector: Arc<dyn StorageConnector>,
    storage: Arc<OnceCell<Arc<dyn StorageApi>>>,
    destination: Option<String>,
}

impl CopyTrigger {
    pub fn new(connector: Arc<dyn StorageConnector>, destination: Option<String>) -> Self {
        Self {
            connector,
            storage: Arc::new(OnceCell::new()),
            destination,
        }
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    async fn storage(&self) -> anyhow::Result<Arc<dyn StorageApi>> {
        self.storage
            .get_or_try_init(|| self.connector.connect())
            .await
            .map(Arc::clone)
    }
}

pub fn create_router(trigger: CopyTrigger) -> Router {
    Router::new()
        .route("/", post(receive_event))
        .with_state(trigger)
}

/// Responds without a body: 400 for malformed events, 500 for failed
/// copies, 204 otherwise.
async fn receive_event(
    State(trigger): State<CopyTrigger>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let ce_id = headers.get(CE_ID_HEADER).and_then(|v| v.to_str().ok());

    let event = match StorageEvent::parse(&body, ce_id) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected storage event");
            return StatusCode::BAD_REQUEST;
        }
    };

    let Ok(destination) = plan_copy(trigger.destination(), &event) else {
        return StatusCode::NO_CONTENT;
    };

    let storage = match trigger.storage().await {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!(error = format!("{:#}", e), "Cannot connect to Cloud Storage");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    match copy_to(storage.as_ref(), destination, &event).await {
        CopyOutcome::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CopyOutcome::Copied | CopyOutcome::MissingDestination | CopyOutcome::SameBucket => {
            StatusCode::NO_CONTENT
        }
    }
}
