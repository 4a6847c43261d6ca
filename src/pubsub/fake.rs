//! In-memory Pub/Sub for tests

use super::{OutgoingMessage, PubSubApi, ReceivedMessage, Subscription, Topic};
use crate::gcp::{ApiError, OperationResult};
use crate::resource::{Page, ProjectContext, ResourceRef};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    topics: BTreeMap<String, Topic>,
    subscriptions: BTreeMap<String, Subscription>,
    published: Vec<(String, OutgoingMessage)>,
    inbox: VecDeque<ReceivedMessage>,
    acked: Vec<String>,
}

/// Pub/Sub fake: topics and subscriptions live in memory, listings are
/// served `page_size` items at a time, and `fail_with` makes every call fail.
pub struct FakePubSub {
    state: Mutex<State>,
    page_size: usize,
    failure: Option<ApiError>,
    calls: AtomicUsize,
}

impl Default for FakePubSub {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: 2,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl FakePubSub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn with_topics(self, project: &ProjectContext, names: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for name in names {
                let path = project.topic(name).path().to_string();
                state.topics.insert(path.clone(), Topic { name: path });
            }
        }
        self
    }

    pub fn with_inbox(self, messages: Vec<ReceivedMessage>) -> Self {
        self.state.lock().unwrap().inbox.extend(messages);
        self
    }

    /// Number of remote calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn acked(&self) -> Vec<String> {
        self.state.lock().unwrap().acked.clone()
    }

    pub fn published(&self) -> Vec<(String, OutgoingMessage)> {
        self.state.lock().unwrap().published.clone()
    }

    fn enter(&self) -> OperationResult<std::sync::MutexGuard<'_, State>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.state.lock().unwrap())
    }

    fn page<T: Clone>(&self, items: Vec<T>, page_token: Option<String>) -> Page<T> {
        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = (start + self.page_size).min(items.len());
        let next = (end < items.len()).then(|| end.to_string());
        Page::new(items[start..end].to_vec(), next)
    }
}

#[async_trait]
impl PubSubApi for FakePubSub {
    async fn list_topics(
        &self,
        project: &ProjectContext,
        page_token: Option<String>,
    ) -> OperationResult<Page<Topic>> {
        let prefix = format!("{}/", project.parent_path());
        let topics: Vec<Topic> = self
            .enter()?
            .topics
            .values()
            .filter(|t| t.name.starts_with(&prefix))
            .cloned()
            .collect();
        Ok(self.page(topics, page_token))
    }

    async fn list_subscriptions(
        &self,
        project: &ProjectContext,
        page_token: Option<String>,
    ) -> OperationResult<Page<Subscription>> {
        let prefix = format!("{}/", project.parent_path());
        let subscriptions: Vec<Subscription> = self
            .enter()?
            .subscriptions
            .values()
            .filter(|s| s.name.starts_with(&prefix))
            .cloned()
            .collect();
        Ok(self.page(subscriptions, page_token))
    }

    async fn list_topic_subscriptions(
        &self,
        topic: &ResourceRef,
        page_token: Option<String>,
    ) -> OperationResult<Page<String>> {
        let state = self.enter()?;
        if !state.topics.contains_key(topic.path()) {
            return Err(ApiError::NotFound("Resource not found".into()));
        }
        let names: Vec<String> = state
            .subscriptions
            .values()
            .filter(|s| s.topic == topic.path())
            .map(|s| s.name.clone())
            .collect();
        drop(state);
        Ok(self.page(names, page_token))
    }

    async fn create_topic(&self, topic: &ResourceRef) -> OperationResult<Topic> {
        let mut state = self.enter()?;
        if state.topics.contains_key(topic.path()) {
            return Err(ApiError::AlreadyExists("Resource already exists in the project".into()));
        }
        let created = Topic {
            name: topic.path().to_string(),
        };
        state.topics.insert(created.name.clone(), created.clone());
        Ok(created)
    }

    async fn delete_topic(&self, topic: &ResourceRef) -> OperationResult<()> {
        let mut state = self.enter()?;
        state
            .topics
            .remove(topic.path())
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound("Resource not found".into()))
    }

    async fn create_subscription(
        &self,
        subscription: &ResourceRef,
        topic: &ResourceRef,
    ) -> OperationResult<Subscription> {
        let mut state = self.enter()?;
        if !state.topics.contains_key(topic.path()) {
            return Err(ApiError::NotFound("Resource not found".into()));
        }
        if state.subscriptions.contains_key(subscription.path()) {
            return Err(ApiError::AlreadyExists("Resource already exists in the project".into()));
        }
        let created = Subscription {
            name: subscription.path().to_string(),
            topic: topic.path().to_string(),
        };
        state
            .subscriptions
            .insert(created.name.clone(), created.clone());
        Ok(created)
    }

    async fn delete_subscription(&self, subscription: &ResourceRef) -> OperationResult<()> {
        let mut state = self.enter()?;
        state
            .subscriptions
            .remove(subscription.path())
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound("Resource not found".into()))
    }

    async fn publish(
        &self,
        topic: &ResourceRef,
        messages: Vec<OutgoingMessage>,
    ) -> OperationResult<Vec<String>> {
        let mut state = self.enter()?;
        if !state.topics.contains_key(topic.path()) {
            return Err(ApiError::NotFound("Resource not found".into()));
        }
        let mut ids = Vec::new();
        for message in messages {
            state.published.push((topic.path().to_string(), message));
            ids.push(state.published.len().to_string());
        }
        Ok(ids)
    }

    async fn pull(
        &self,
        _subscription: &ResourceRef,
        max_messages: u32,
    ) -> OperationResult<Vec<ReceivedMessage>> {
        let batch: Vec<ReceivedMessage> = {
            let mut state = self.enter()?;
            let take = (max_messages as usize).min(state.inbox.len());
            state.inbox.drain(..take).collect()
        };
        if batch.is_empty() {
            // Mimic a long poll with nothing to deliver
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        Ok(batch)
    }

    async fn acknowledge(
        &self,
        _subscription: &ResourceRef,
        ack_ids: Vec<String>,
    ) -> OperationResult<()> {
        self.enter()?.acked.extend(ack_ids);
        Ok(())
    }
}

/// A received message with the given ack ID and text payload
pub fn received(ack_id: &str, text: &str) -> ReceivedMessage {
    ReceivedMessage {
        ack_id: ack_id.to_string(),
        message_id: format!("msg-{}", ack_id),
        data: text.as_bytes().to_vec(),
        attributes: BTreeMap::new(),
    }
}
