pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::{
    base::types::{Res, UserId, Void},
    tally::classify::MembershipResolver,
};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat
/// platforms like Slack. Implementing this trait allows different chat
/// services to be used with the tally-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier for the bot in the chat platform,
    /// which is used to detect when the bot is mentioned.
    fn bot_user_id(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// This sets up event listeners for the chat platform and begins
    /// feeding incoming events into the tally pipeline.
    async fn start(&self) -> Void;

    /// Send a message to a channel thread.
    ///
    /// Used to answer `stats` and `help` mentions in-channel.
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void;

    /// Get the current member list of a channel.
    ///
    /// Membership is what turns a posted message into a set of inbox
    /// recipients.
    async fn members_of(&self, channel_id: &str) -> Res<Vec<UserId>>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}

/// The chat platform is the production membership source.
#[async_trait]
impl MembershipResolver for ChatClient {
    async fn members_of(&self, channel: &str) -> Res<Vec<UserId>> {
        self.inner.members_of(channel).await
    }
}
