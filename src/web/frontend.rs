//! Frontend page calling the backend API

use super::backend::DataResponse;
use axum::{extract::State, response::Html, routing::get, Router};
use std::time::Duration;

/// Backend used when `BACKEND_URL` is not set
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8081";

const BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct FrontendState {
    client: reqwest::Client,
    backend_url: String,
}

impl FrontendState {
    pub fn new(backend_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(BACKEND_TIMEOUT)
            .user_agent(concat!("gcpkit-frontend/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            backend_url: backend_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_data(&self) -> reqwest::Result<DataResponse> {
        self.client
            .get(format!("{}/data", self.backend_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

pub fn create_router(state: FrontendState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

async fn index(State(state): State<FrontendState>) -> Html<String> {
    let (status, message) = match state.fetch_data().await {
        Ok(data) => ("Connected to Backend!".to_string(), data.message),
        Err(e) => {
            tracing::warn!(backend = %state.backend_url, error = %e, "Backend call failed");
            (
                format!("Error: {}", e),
                "Could not connect to backend".to_string(),
            )
        }
    };
    Html(render_page(&status, &message))
}

fn render_page(status: &str, message: &str) -> String {
    format!(
        "\n    <h1>Frontend Service</h1>\n    <p>Status: <b>{}</b></p>\n    <p>Message from Backend: <i>{}</i></p>\n    ",
        escape_html(status),
        escape_html(message)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
