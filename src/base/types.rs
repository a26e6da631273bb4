//! Common types and result aliases shared across the tally-bot.

use serde::{Deserialize, Serialize};

/// Crate-wide error type.
pub type Err = anyhow::Error;
/// Crate-wide result type.
pub type Res<T> = Result<T, Err>;
/// Result with no payload.
pub type Void = Res<()>;

/// Platform-assigned user identifier (e.g., `U12345`).
pub type UserId = String;
/// Platform-assigned channel identifier (e.g., `C12345`).
pub type ChannelId = String;
/// Platform-assigned message identifier (Slack uses the message `ts`).
pub type MessageId = String;

/// A normalized inbound channel event, as delivered by the chat transport.
///
/// Only the two event kinds the tally engine cares about are represented;
/// everything else is dropped at the transport boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChannelEvent {
    /// A new top-level message was posted to the channel.
    MessagePosted {
        /// The user who posted the message.
        sender: UserId,
        /// The channel the message was posted in.
        channel: ChannelId,
        /// The identifier of the posted message.
        message: MessageId,
    },
    /// A reaction was added to an existing message.
    ReactionAdded {
        /// The user who added the reaction.
        reactor: UserId,
        /// The message the reaction was added to.
        message: MessageId,
        /// The reaction name (without colons).
        reaction: String,
    },
}

/// The result of classifying a [`ChannelEvent`] against channel membership
/// and the bookmark reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClassifiedEvent {
    /// A message that should count against every recipient's inbox.
    NewMessage {
        /// The user who posted the message.
        sender: UserId,
        /// The channel members whose inbox counts should increment.
        recipients: Vec<UserId>,
    },
    /// A bookmark reaction, credited to `owner` per the attribution policy.
    Bookmark {
        /// The user credited with the bookmark.
        owner: UserId,
    },
    /// Anything the tally engine does not track.
    Ignored,
}
