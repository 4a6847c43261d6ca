//! Interactive Pub/Sub menu

use super::{operations, PubSubApi};
use crate::menu::{Dispatch, Field, Menu, MenuEntry};
use crate::resource::ProjectContext;
use crate::ui::Console;
use async_trait::async_trait;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PubSubCommand {
    ListTopics,
    /// `None` lists every subscription in the project
    ListSubscriptions(Option<String>),
    CreateTopic(String),
    CreateSubscription { topic: String, subscription: String },
    DeleteTopic(String),
    DeleteSubscription(String),
}

pub static PUBSUB_MENU: Menu<PubSubCommand> = Menu {
    title: "PUBSUB MENU",
    entries: &[
        MenuEntry {
            label: "List all topics",
            announce: Some("📋 Listing all topics..."),
            fields: &[],
            rejection: "",
            build: |_| PubSubCommand::ListTopics,
        },
        MenuEntry {
            label: "List all subscriptions",
            announce: None,
            fields: &[Field::optional("Topic ID (keep empty for all subscriptions)")],
            rejection: "",
            build: |mut a| PubSubCommand::ListSubscriptions(a.optional()),
        },
        MenuEntry {
            label: "Create a topic",
            announce: None,
            fields: &[Field::required("Topic Name")],
            rejection: "Topic name cannot be empty",
            build: |mut a| PubSubCommand::CreateTopic(a.text()),
        },
        MenuEntry {
            label: "Create a subscription",
            announce: None,
            fields: &[
                Field::required("Topic Name"),
                Field::required("Subscription Name"),
            ],
            rejection: "Topic name and Subscription name cannot be empty",
            build: |mut a| PubSubCommand::CreateSubscription {
                topic: a.text(),
                subscription: a.text(),
            },
        },
        MenuEntry {
            label: "Delete a topic",
            announce: None,
            fields: &[Field::required("Topic Name")],
            rejection: "Topic name cannot be empty",
            build: |mut a| PubSubCommand::DeleteTopic(a.text()),
        },
        MenuEntry {
            label: "Delete a subscription",
            announce: None,
            fields: &[Field::required("Subscription Name")],
            rejection: "Subscription name cannot be empty",
            build: |mut a| PubSubCommand::DeleteSubscription(a.text()),
        },
    ],
};

/// Runs Pub/Sub commands against one project
pub struct PubSubHandler<'a> {
    pub api: &'a dyn PubSubApi,
    pub ctx: &'a ProjectContext,
}

#[async_trait(?Send)]
impl Dispatch<PubSubCommand> for PubSubHandler<'_> {
    async fn dispatch<W: Write>(&self, command: PubSubCommand, console: &mut Console<W>) {
        let (api, ctx) = (self.api, self.ctx);
        // Outcomes are already reported on the console
        let _ = match command {
            PubSubCommand::ListTopics => operations::list_all_topics(api, ctx, console).await.map(drop),
            PubSubCommand::ListSubscriptions(topic) => {
                operations::list_subscriptions(api, ctx, console, topic.as_deref())
                    .await
                    .map(drop)
            }
            PubSubCommand::CreateTopic(topic) => {
                operations::create_topic(api, ctx, console, &topic).await.map(drop)
            }
            PubSubCommand::CreateSubscription {
                topic,
                subscription,
            } => operations::create_subscription(api, ctx, console, &topic, &subscription)
                .await
                .map(drop),
            PubSubCommand::DeleteTopic(topic) => {
                operations::delete_topic(api, ctx, console, &topic).await
            }
            PubSubCommand::DeleteSubscription(subscription) => {
                operations::delete_subscription(api, ctx, console, &subscription).await
            }
        };
    }
}
