//! gcpkit
//!
//! Small Google Cloud utilities built on one authenticated REST client:
//! interactive menus for Pub/Sub, projects, Cloud Storage and Firestore, a
//! bounded Pub/Sub listener, Secret Manager checks, a storage copy trigger
//! and two toy web services.

pub mod config;
pub mod firestore;
pub mod gcp;
pub mod logdemo;
pub mod menu;
pub mod projects;
pub mod pubsub;
pub mod resource;
pub mod secrets;
pub mod storage;
pub mod trigger;
pub mod ui;
pub mod web;

/// Version injected at compile time via GCPKIT_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("GCPKIT_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
