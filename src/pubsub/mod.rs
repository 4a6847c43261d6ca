//! Pub/Sub
//!
//! Topic and subscription management, publishing and a bounded-duration
//! listener.
//!
//! - [`PubSubApi`] - the remote surface, implemented over REST by
//!   [`GcpClient`](crate::gcp::GcpClient)
//! - [`operations`] - one remote call each, with user-facing output
//! - [`listen`] - background pull loop with acknowledgement and cancellation
//! - [`menu`] - the interactive Pub/Sub menu

pub mod listen;
pub mod menu;
pub mod operations;
mod rest;

#[cfg(test)]
pub(crate) mod fake;

use crate::gcp::OperationResult;
use crate::resource::{Page, ProjectContext, ResourceRef};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// A Pub/Sub topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    /// Fully-qualified name, `projects/{project}/topics/{topic}`
    pub name: String,
}

/// A Pub/Sub subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub name: String,
    /// Fully-qualified topic name; `_deleted-topic_` once the topic is gone
    pub topic: String,
}

/// A message to publish
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutgoingMessage {
    pub data: Vec<u8>,
    pub attributes: BTreeMap<String, String>,
}

impl OutgoingMessage {
    pub fn text(data: &str) -> Self {
        Self {
            data: data.as_bytes().to_vec(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

/// A message delivered by a pull
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub ack_id: String,
    pub message_id: String,
    pub data: Vec<u8>,
    pub attributes: BTreeMap<String, String>,
}

impl ReceivedMessage {
    /// Payload as text, lossy for non UTF-8 data
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Remote Pub/Sub API
#[async_trait]
pub trait PubSubApi: Send + Sync {
    async fn list_topics(
        &self,
        project: &ProjectContext,
        page_token: Option<String>,
    ) -> OperationResult<Page<Topic>>;

    async fn list_subscriptions(
        &self,
        project: &ProjectContext,
        page_token: Option<String>,
    ) -> OperationResult<Page<Subscription>>;

    /// Names of the subscriptions attached to one topic
    async fn list_topic_subscriptions(
        &self,
        topic: &ResourceRef,
        page_token: Option<String>,
    ) -> OperationResult<Page<String>>;

    async fn create_topic(&self, topic: &ResourceRef) -> OperationResult<Topic>;

    async fn delete_topic(&self, topic: &ResourceRef) -> OperationResult<()>;

    async fn create_subscription(
        &self,
        subscription: &ResourceRef,
        topic: &ResourceRef,
    ) -> OperationResult<Subscription>;

    async fn delete_subscription(&self, subscription: &ResourceRef) -> OperationResult<()>;

    /// Publish messages, returning their server-assigned IDs
    async fn publish(
        &self,
        topic: &ResourceRef,
        messages: Vec<OutgoingMessage>,
    ) -> OperationResult<Vec<String>>;

    async fn pull(
        &self,
        subscription: &ResourceRef,
        max_messages: u32,
    ) -> OperationResult<Vec<ReceivedMessage>>;

    async fn acknowledge(
        &self,
        subscription: &ResourceRef,
        ack_ids: Vec<String>,
    ) -> OperationResult<()>;
}
