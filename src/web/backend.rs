//! Backend API

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Payload of `GET /data`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse {
    pub message: String,
    pub database_status: String,
}

impl Default for DataResponse {
    fn default() -> Self {
        Self {
            message: "Hello from the Secure Backend API!".to_string(),
            database_status: "Simulated Connection to Firestore".to_string(),
        }
    }
}

pub fn create_router() -> Router {
    Router::new().route("/data", get(data))
}

async fn data() -> Json<DataResponse> {
    tracing::debug!("Serving /data");
    Json(DataResponse::default())
}
