//! Pub/Sub operations
//!
//! Each function makes one remote call (listings follow page tokens),
//! prints the outcome and returns it.

use super::{OutgoingMessage, PubSubApi, Subscription, Topic};
use crate::gcp::ApiError;
use crate::resource::{for_each_item, require, OpResult, ProjectContext};
use crate::ui::console::BANNER_WIDTH;
use crate::ui::{Console, ErrorReport};
use std::io::Write;

fn display_project<W: Write>(console: &mut Console<W>, ctx: &ProjectContext) {
    console.success(format!("Project: {}", ctx.project_id()));
}

/// List every topic in the project, returning how many were printed
pub async fn list_all_topics<W: Write>(
    api: &dyn PubSubApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
) -> OpResult<usize> {
    display_project(console, ctx);
    console.banner("PUBSUB TOPICS LIST", BANNER_WIDTH);

    let listed = for_each_item(
        |token| api.list_topics(ctx, token),
        |n, topic: Topic| {
            console.notice(format!("{}. Topic ID: {}", n, topic.name));
            console.rule('-', BANNER_WIDTH);
        },
    )
    .await;

    let count = match listed {
        Ok(count) => count,
        Err(e) => {
            let report = ErrorReport::new("listing topics").permission("pubsub.topics.list");
            return report.fail(console, e);
        }
    };

    if count == 0 {
        console.notice("No topics found.");
        console.line("Make sure you have the 'pubsub.topics.list' permission.");
    } else {
        console.notice(format!("Total Topics Found: {}", count));
    }
    console.rule('=', BANNER_WIDTH);

    Ok(count)
}

/// List subscriptions of one topic, or of the whole project when `topic`
/// is `None`
pub async fn list_subscriptions<W: Write>(
    api: &dyn PubSubApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    topic: Option<&str>,
) -> OpResult<usize> {
    display_project(console, ctx);

    let topic = topic.map(str::trim).filter(|t| !t.is_empty());
    let listed = match topic {
        Some(topic_id) => {
            console.banner(format!("SUBSCRIPTIONS FOR TOPIC: {}", topic_id), BANNER_WIDTH);
            let topic_ref = ctx.topic(topic_id);
            for_each_item(
                |token| api.list_topic_subscriptions(&topic_ref, token),
                |n, name: String| {
                    console.notice(format!("{}. Subscription ID: {}", n, name));
                    console.rule('-', BANNER_WIDTH);
                },
            )
            .await
        }
        None => {
            console.banner(
                format!("SUBSCRIPTIONS FOR PROJECT: {}", ctx.project_id()),
                BANNER_WIDTH,
            );
            for_each_item(
                |token| api.list_subscriptions(ctx, token),
                |n, subscription: Subscription| {
                    console.notice(format!("{}. Subscription ID: {}", n, subscription.name));
                    console.line(format!("   Topic: {}", subscription.topic));
                    console.rule('-', BANNER_WIDTH);
                },
            )
            .await
        }
    };

    let count = match listed {
        Ok(count) => count,
        Err(e) => {
            let mut report =
                ErrorReport::new("listing subscriptions").permission("pubsub.subscriptions.list");
            if let Some(topic_id) = topic {
                report = report.not_found("Topic", topic_id);
            }
            return report.fail(console, e);
        }
    };

    if count == 0 {
        console.notice("No subscriptions found.");
        console.line("Make sure you have the 'pubsub.subscriptions.list' permission.");
    } else {
        console.notice(format!("Total Subscriptions Found: {}", count));
    }
    console.rule('=', BANNER_WIDTH);

    Ok(count)
}

pub async fn create_topic<W: Write>(
    api: &dyn PubSubApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    topic_name: &str,
) -> OpResult<Topic> {
    let topic_name = require(console, "Topic name", topic_name)?;
    display_project(console, ctx);

    match api.create_topic(&ctx.topic(topic_name)).await {
        Ok(topic) => {
            tracing::info!(topic = %topic.name, "Topic created");
            console.success(format!("Topic '{}' created successfully", topic_name));
            Ok(topic)
        }
        Err(e) => {
            let report = ErrorReport::new("creating topic")
                .permission("pubsub.topics.create")
                .already_exists("Topic", topic_name);
            report.fail(console, e)
        }
    }
}

pub async fn create_subscription<W: Write>(
    api: &dyn PubSubApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    topic_name: &str,
    subscription_name: &str,
) -> OpResult<Subscription> {
    let topic_name = require(console, "Topic name", topic_name)?;
    let subscription_name = require(console, "Subscription name", subscription_name)?;
    display_project(console, ctx);

    let subscription = ctx.subscription(subscription_name);
    match api.create_subscription(&subscription, &ctx.topic(topic_name)).await {
        Ok(created) => {
            tracing::info!(subscription = %created.name, topic = %created.topic, "Subscription created");
            console.success(format!(
                "Subscription '{}' created successfully",
                subscription_name
            ));
            Ok(created)
        }
        Err(e) => {
            // A missing resource here is the topic being subscribed to
            let report = ErrorReport::new("creating subscription")
                .permission("pubsub.subscriptions.create")
                .not_found("Topic", topic_name)
                .already_exists("Subscription", subscription_name);
            report.fail(console, e)
        }
    }
}

pub async fn delete_topic<W: Write>(
    api: &dyn PubSubApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    topic_name: &str,
) -> OpResult<()> {
    let topic_name = require(console, "Topic name", topic_name)?;
    display_project(console, ctx);

    match api.delete_topic(&ctx.topic(topic_name)).await {
        Ok(()) => {
            tracing::info!(topic = topic_name, "Topic deleted");
            console.success(format!("Topic '{}' deleted successfully", topic_name));
            Ok(())
        }
        Err(e) => {
            let report = ErrorReport::new("deleting topic")
                .permission("pubsub.topics.delete")
                .not_found("Topic", topic_name);
            report.fail(console, e)
        }
    }
}

pub async fn delete_subscription<W: Write>(
    api: &dyn PubSubApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    subscription_name: &str,
) -> OpResult<()> {
    let subscription_name = require(console, "Subscription name", subscription_name)?;
    display_project(console, ctx);

    match api.delete_subscription(&ctx.subscription(subscription_name)).await {
        Ok(()) => {
            tracing::info!(subscription = subscription_name, "Subscription deleted");
            console.success(format!(
                "Subscription '{}' deleted successfully",
                subscription_name
            ));
            Ok(())
        }
        Err(e) => {
            let report = ErrorReport::new("deleting subscription")
                .permission("pubsub.subscriptions.delete")
                .not_found("Subscription", subscription_name);
            report.fail(console, e)
        }
    }
}

/// Publish one message, returning its server-assigned ID
pub async fn publish_message<W: Write>(
    api: &dyn PubSubApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    topic_name: &str,
    message: OutgoingMessage,
) -> OpResult<String> {
    let topic_name = require(console, "Topic name", topic_name)?;
    let has_attributes = !message.attributes.is_empty();

    let published = api.publish(&ctx.topic(topic_name), vec![message]).await;
    let message_id = match published {
        Ok(ids) => ids.into_iter().next().ok_or_else(|| {
            ApiError::Unknown("Publish response carried no message ID".to_string())
        }),
        Err(e) => Err(e),
    };

    match message_id {
        Ok(id) => {
            tracing::info!(topic = topic_name, message_id = %id, "Message published");
            if has_attributes {
                console.line(format!("Published message with attributes. ID: {}", id));
            } else {
                console.line(format!("Published message ID: {}", id));
            }
            Ok(id)
        }
        Err(e) => {
            let report = ErrorReport::new("publishing message")
                .permission("pubsub.topics.publish")
                .not_found("Topic", topic_name);
            report.fail(console, e)
        }
    }
}
