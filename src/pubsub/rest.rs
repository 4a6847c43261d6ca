//! Pub/Sub over the REST API

use super::{OutgoingMessage, PubSubApi, ReceivedMessage, Subscription, Topic};
use crate::gcp::client::add_query_params;
use crate::gcp::{ApiError, GcpClient, OperationResult};
use crate::resource::{Page, ProjectContext, ResourceRef};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicsPage {
    #[serde(default)]
    topics: Vec<WireTopic>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct WireTopic {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionsPage {
    #[serde(default)]
    subscriptions: Vec<WireSubscription>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct WireSubscription {
    name: String,
    #[serde(default)]
    topic: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicSubscriptionsPage {
    #[serde(default)]
    subscriptions: Vec<String>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullResponse {
    #[serde(default)]
    received_messages: Vec<WireReceivedMessage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReceivedMessage {
    ack_id: String,
    message: WireMessage,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(default)]
    data: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    message_id: String,
}

fn decode<T: DeserializeOwned>(value: Value) -> OperationResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Unknown(format!("Unexpected Pub/Sub response: {}", e)))
}

impl GcpClient {
    async fn pubsub_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page_token: Option<&str>,
    ) -> OperationResult<T> {
        let url = add_query_params(&self.pubsub_url(path), &[("pageToken", page_token)])?;
        decode(self.get(&url).await?)
    }
}

#[async_trait]
impl PubSubApi for GcpClient {
    async fn list_topics(
        &self,
        project: &ProjectContext,
        page_token: Option<String>,
    ) -> OperationResult<Page<Topic>> {
        let path = format!("{}/topics", project.parent_path());
        let page: TopicsPage = self.pubsub_page(&path, page_token.as_deref()).await?;
        let topics = page.topics.into_iter().map(|t| Topic { name: t.name }).collect();
        Ok(Page::new(topics, page.next_page_token))
    }

    async fn list_subscriptions(
        &self,
        project: &ProjectContext,
        page_token: Option<String>,
    ) -> OperationResult<Page<Subscription>> {
        let path = format!("{}/subscriptions", project.parent_path());
        let page: SubscriptionsPage = self.pubsub_page(&path, page_token.as_deref()).await?;
        let subscriptions = page
            .subscriptions
            .into_iter()
            .map(|s| Subscription {
                name: s.name,
                topic: s.topic,
            })
            .collect();
        Ok(Page::new(subscriptions, page.next_page_token))
    }

    async fn list_topic_subscriptions(
        &self,
        topic: &ResourceRef,
        page_token: Option<String>,
    ) -> OperationResult<Page<String>> {
        let path = format!("{}/subscriptions", topic.path());
        let page: TopicSubscriptionsPage = self.pubsub_page(&path, page_token.as_deref()).await?;
        Ok(Page::new(page.subscriptions, page.next_page_token))
    }

    async fn create_topic(&self, topic: &ResourceRef) -> OperationResult<Topic> {
        let created: WireTopic = decode(self.put(&self.pubsub_url(topic.path()), &json!({})).await?)?;
        Ok(Topic { name: created.name })
    }

    async fn delete_topic(&self, topic: &ResourceRef) -> OperationResult<()> {
        self.delete(&self.pubsub_url(topic.path())).await?;
        Ok(())
    }

    async fn create_subscription(
        &self,
        subscription: &ResourceRef,
        topic: &ResourceRef,
    ) -> OperationResult<Subscription> {
        let body = json!({ "topic": topic.path() });
        let created: WireSubscription =
            decode(self.put(&self.pubsub_url(subscription.path()), &body).await?)?;
        Ok(Subscription {
            name: created.name,
            topic: created.topic,
        })
    }

    async fn delete_subscription(&self, subscription: &ResourceRef) -> OperationResult<()> {
        self.delete(&self.pubsub_url(subscription.path())).await?;
        Ok(())
    }

    async fn publish(
        &self,
        topic: &ResourceRef,
        messages: Vec<OutgoingMessage>,
    ) -> OperationResult<Vec<String>> {
        let messages: Vec<Value> = messages
            .iter()
            .map(|m| {
                json!({
                    "data": BASE64.encode(&m.data),
                    "attributes": m.attributes,
                })
            })
            .collect();
        let url = format!("{}:publish", self.pubsub_url(topic.path()));
        let response: PublishResponse =
            decode(self.post(&url, Some(&json!({ "messages": messages }))).await?)?;
        Ok(response.message_ids)
    }

    async fn pull(
        &self,
        subscription: &ResourceRef,
        max_messages: u32,
    ) -> OperationResult<Vec<ReceivedMessage>> {
        let url = format!("{}:pull", self.pubsub_url(subscription.path()));
        let body = json!({ "maxMessages": max_messages });
        let response: PullResponse = decode(self.post(&url, Some(&body)).await?)?;

        response
            .received_messages
            .into_iter()
            .map(|received| {
                let data = BASE64.decode(received.message.data.as_bytes()).map_err(|e| {
                    ApiError::Unknown(format!("Invalid message payload encoding: {}", e))
                })?;
                Ok(ReceivedMessage {
                    ack_id: received.ack_id,
                    message_id: received.message.message_id,
                    data,
                    attributes: received.message.attributes,
                })
            })
            .collect()
    }

    async fn acknowledge(
        &self,
        subscription: &ResourceRef,
        ack_ids: Vec<String>,
    ) -> OperationResult<()> {
        let url = format!("{}:acknowledge", self.pubsub_url(subscription.path()));
        self.post(&url, Some(&json!({ "ackIds": ack_ids }))).await?;
        Ok(())
    }
}
