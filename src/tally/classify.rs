//! Classification of raw channel events into tally updates.

use std::{collections::HashMap, sync::RwLock};

use async_trait::async_trait;
use tracing::{instrument, warn};

use crate::base::{
    config::SavedAttribution,
    types::{ChannelEvent, ClassifiedEvent, MessageId, Res, UserId},
};

/// Supplies the current member list of a channel.
///
/// This is an injected collaborator: the production implementation asks the
/// chat platform, tests supply a fixed map. Resolution is allowed to fail;
/// the classifier treats a failure as an ignorable event, not an error.
#[async_trait]
pub trait MembershipResolver: Send + Sync + 'static {
    async fn members_of(&self, channel: &str) -> Res<Vec<UserId>>;
}

/// Turns a [`ChannelEvent`] into a [`ClassifiedEvent`].
///
/// The classifier keeps one piece of internal state: a message-id to sender
/// index, populated from every message it sees, so a later bookmark reaction
/// can be attributed to the original sender. Nothing else about a message is
/// retained.
pub struct Classifier<M: MembershipResolver> {
    membership: M,
    bookmark_reaction: String,
    attribution: SavedAttribution,
    owners: RwLock<HashMap<MessageId, UserId>>,
}

impl<M: MembershipResolver> Classifier<M> {
    pub fn new(membership: M, bookmark_reaction: impl Into<String>, attribution: SavedAttribution) -> Self {
        Self {
            membership,
            bookmark_reaction: bookmark_reaction.into(),
            attribution,
            owners: RwLock::new(HashMap::new()),
        }
    }

    /// Classifies one event. Never fails: anything unresolvable comes back
    /// as [`ClassifiedEvent::Ignored`] with a warning logged.
    #[instrument(skip_all)]
    pub async fn classify(&self, event: ChannelEvent) -> ClassifiedEvent {
        match event {
            ChannelEvent::MessagePosted { sender, channel, message } => self.classify_message(sender, &channel, message).await,
            ChannelEvent::ReactionAdded { reactor, message, reaction } => self.classify_reaction(reactor, &message, &reaction),
        }
    }

    async fn classify_message(&self, sender: UserId, channel: &str, message: MessageId) -> ClassifiedEvent {
        // Remember who sent it, so a later bookmark can find its owner. This
        // happens before membership resolution so a reaction on the message
        // still attributes even if the member lookup fails here.
        self.owners.write().unwrap_or_else(|e| e.into_inner()).insert(message, sender.clone());

        let members = match self.membership.members_of(channel).await {
            Ok(members) => members,
            Err(err) => {
                warn!("Could not resolve members of `{}`; ignoring message: {}", channel, err);
                return ClassifiedEvent::Ignored;
            }
        };

        let recipients: Vec<UserId> = members.into_iter().filter(|member| member != &sender).collect();

        ClassifiedEvent::NewMessage { sender, recipients }
    }

    fn classify_reaction(&self, reactor: UserId, message: &str, reaction: &str) -> ClassifiedEvent {
        if reaction != self.bookmark_reaction {
            return ClassifiedEvent::Ignored;
        }

        let owner = match self.attribution {
            SavedAttribution::Reactor => reactor,
            SavedAttribution::MessageOwner => {
                let owners = self.owners.read().unwrap_or_else(|e| e.into_inner());

                match owners.get(message) {
                    Some(owner) => owner.clone(),
                    None => {
                        warn!("Bookmark on unknown message `{}`; cannot attribute, ignoring.", message);
                        return ClassifiedEvent::Ignored;
                    }
                }
            }
        };

        ClassifiedEvent::Bookmark { owner }
    }
}
