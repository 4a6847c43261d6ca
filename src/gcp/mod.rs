//! GCP API interaction module
//!
//! Authentication, the shared REST client and the error kinds every remote
//! call maps onto.
//!
//! # Module Structure
//!
//! - [`auth`] - Application Default Credentials, static tokens, gcloud defaults
//! - [`client`] - Main GCP client and per-service URL builders
//! - [`error`] - Closed [`ApiError`](error::ApiError) enumeration
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use gcpkit::gcp::client::GcpClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::new().await?;
//!     let topics = client.get(&client.pubsub_url("projects/my-project/topics")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;

pub use client::GcpClient;
pub use error::{ApiError, OperationResult};
