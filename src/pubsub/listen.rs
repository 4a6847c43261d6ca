//! Bounded-duration listener
//!
//! A background task pulls from a subscription, runs the callback for each
//! message and then acknowledges that message. The foreground waits for the
//! listen duration and then cancels the task.

use super::{PubSubApi, ReceivedMessage};
use crate::gcp::ApiError;
use crate::resource::{require, OpResult, ProjectContext, ResourceRef};
use crate::ui::{Console, ErrorReport};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Messages requested per pull
pub const MAX_MESSAGES_PER_PULL: u32 = 10;

/// Why listening ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The listen duration elapsed and the listener was cancelled
    DurationElapsed,
    /// Pulling or acknowledging failed
    Failed(ApiError),
}

/// Outcome of one listening session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenSummary {
    /// Messages handed to the callback and acknowledged
    pub processed: usize,
    pub stopped: StopReason,
}

/// Listen on `subscription` for `duration`, calling `callback` once per
/// delivered message before acknowledging it.
pub async fn listen<F>(
    api: Arc<dyn PubSubApi>,
    subscription: ResourceRef,
    duration: Duration,
    mut callback: F,
) -> ListenSummary
where
    F: FnMut(&ReceivedMessage) + Send + 'static,
{
    let processed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&processed);

    let mut handle = tokio::spawn(async move {
        pull_loop(api.as_ref(), &subscription, &mut callback, &counter).await
    });

    let stopped = match tokio::time::timeout(duration, &mut handle).await {
        Ok(Ok(Err(e))) => StopReason::Failed(e),
        Ok(Ok(Ok(()))) => StopReason::DurationElapsed,
        Ok(Err(join_error)) => StopReason::Failed(ApiError::Unknown(join_error.to_string())),
        Err(_) => {
            tracing::debug!("Listen duration elapsed, cancelling listener");
            handle.abort();
            // Wait for the abort so no callback runs after we return
            let _ = handle.await;
            StopReason::DurationElapsed
        }
    };

    ListenSummary {
        processed: processed.load(Ordering::SeqCst),
        stopped,
    }
}

async fn pull_loop<F>(
    api: &dyn PubSubApi,
    subscription: &ResourceRef,
    callback: &mut F,
    processed: &AtomicUsize,
) -> Result<(), ApiError>
where
    F: FnMut(&ReceivedMessage),
{
    loop {
        let batch = api.pull(subscription, MAX_MESSAGES_PER_PULL).await?;
        for message in batch {
            callback(&message);
            api.acknowledge(subscription, vec![message.ack_id.clone()])
                .await?;
            processed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Listen with console reporting around [`listen`]
pub async fn subscribe_messages<W, F>(
    api: Arc<dyn PubSubApi>,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    subscription_name: &str,
    duration: Duration,
    callback: F,
) -> OpResult<ListenSummary>
where
    W: Write,
    F: FnMut(&ReceivedMessage) + Send + 'static,
{
    let subscription_name = require(console, "Subscription name", subscription_name)?;
    let subscription = ctx.subscription(subscription_name);
    console.line(format!("Listening for messages on {}...\n", subscription.path()));

    let summary = listen(api, subscription, duration, callback).await;
    tracing::info!(
        subscription = subscription_name,
        processed = summary.processed,
        "Listener stopped"
    );

    match &summary.stopped {
        StopReason::DurationElapsed => {
            console.line(format!(
                "Listening stopped: no more messages expected after {:?} ({} received)",
                duration, summary.processed
            ));
            Ok(summary)
        }
        StopReason::Failed(e) => {
            console.line(format!("Listening stopped: {}", e.message()));
            ErrorReport::new("listening for messages")
                .permission("pubsub.subscriptions.consume")
                .not_found("Subscription", subscription_name)
                .render(console, e);
            Err(e.clone().into())
        }
    }
}

/// Human-readable rendering of a received message
pub fn describe_message(message: &ReceivedMessage) -> String {
    let mut text = format!("Received message: {}", message.text());
    if !message.attributes.is_empty() {
        let attributes: Vec<String> = message
            .attributes
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        text.push_str(&format!("\nAttributes: {{{}}}", attributes.join(", ")));
    }
    text
}
