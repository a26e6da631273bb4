//! Slack integration for tally-bot.
//!
//! This module connects to Slack over socket mode and feeds the two event
//! kinds the tally engine cares about (messages and reactions) into the
//! classification pipeline. It also answers `stats`/`help` app mentions and
//! backs the membership resolver with `conversations.members`.

use crate::{
    base::{
        config::Config,
        types::{ChannelEvent, Res, UserId, Void},
    },
    interaction,
    tally::{classify::Classifier, store::CounterStore},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::{ops::Deref, sync::Arc};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config, store: CounterStore) -> Res<Self> {
        let client = SlackChatClient::new(config, store).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    store: CounterStore,
    classifier: Arc<Classifier<ChatClient>>,
    chat: ChatClient,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
    pub store: CounterStore,
    pub config: Config,
}

impl Deref for SlackChatClient {
    type Target = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, store: CounterStore) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
            store,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self) -> Void {
        // The classifier resolves membership through this same client.

        let classifier = Arc::new(Classifier::new(
            ChatClient::from(self.clone()),
            self.config.bookmark_reaction.clone(),
            self.config.saved_attribution,
        ));

        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            store: self.store.clone(),
            classifier,
            chat: ChatClient::from(self.clone()),
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events,
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Start WS connections calling Slack API to get WS url for the token,
        // and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message)
            .with_as_user(true)
            .with_thread_ts(SlackTs(thread_ts.to_string()))
            .with_link_names(true);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn members_of(&self, channel_id: &str) -> Res<Vec<UserId>> {
        let request = SlackApiConversationsMembersRequest::new().with_channel(SlackChannelId(channel_id.to_string())).with_limit(1000);

        let session = self.client.open_session(&self.bot_token);

        let response = session.conversations_members(&request).await.map_err(|e| anyhow::anyhow!("Failed to list channel members: {}", e))?;

        Ok(response.members.into_iter().map(|id| id.0).collect())
    }
}

// Socket mode listener callbacks for Slack.

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            info!("Received message event ...");

            // Messages from bots (including this one) never count against anyone's inbox.
            if slack_message_event.sender.bot_id.is_some() {
                debug!("Skipping bot message.");
                return Ok(());
            }

            let Some(sender) = slack_message_event.sender.user.clone() else {
                warn!("Message event without a sender; skipping.");
                return Ok(());
            };

            let channel = slack_message_event.origin.channel.as_ref().ok_or(anyhow::anyhow!("Failed to get channel ID"))?.0.to_owned();

            let event = ChannelEvent::MessagePosted {
                sender: sender.0,
                channel,
                message: slack_message_event.origin.ts.0.clone(),
            };

            // Handled inline rather than on a spawned task, so a reaction can
            // never be processed ahead of the message it targets.
            interaction::channel_event::handle_channel_event(event, &user_state.classifier, &user_state.store).await;
        }
        SlackEventCallbackBody::ReactionAdded(reaction_event) => {
            info!("Received reaction event ...");

            let SlackReactionsItem::Message(message) = &reaction_event.item else {
                debug!("Reaction on a non-message item; skipping.");
                return Ok(());
            };

            let event = ChannelEvent::ReactionAdded {
                reactor: reaction_event.user.0.clone(),
                message: message.origin.ts.0.clone(),
                reaction: reaction_event.reaction.0.clone(),
            };

            interaction::channel_event::handle_channel_event(event, &user_state.classifier, &user_state.store).await;
        }
        SlackEventCallbackBody::ReactionRemoved(_) => {
            // Counters only ever grow within a run; removals are not tracked.
            debug!("Ignoring reaction removal.");
        }
        SlackEventCallbackBody::AppMention(slack_app_mention_event) => {
            info!("Received app mention event ...");

            let channel_id = slack_app_mention_event.channel.0.to_owned();
            let thread_ts = slack_app_mention_event.origin.thread_ts.clone().unwrap_or(slack_app_mention_event.origin.ts.clone()).0;
            let text = slack_app_mention_event.content.text.clone().unwrap_or_default();

            interaction::app_mention::handle_app_mention(
                slack_app_mention_event.user.0.to_owned(),
                channel_id,
                thread_ts,
                text,
                user_state.store.clone(),
                user_state.chat.clone(),
            );
        }
        _ => {
            debug!("Received unhandled push event.")
        }
    }

    Ok(())
}
