//! Handles `@bot stats` and `@bot help` mentions.

use tracing::{Instrument, error, instrument, warn};

use crate::{
    base::types::{ChannelId, UserId, Void},
    service::chat::ChatClient,
    tally::store::CounterStore,
};

const HELP_TEXT: &str = "\
*Tally-bot* keeps per-user message counts in this channel.\n\
• `@bot stats` — your current inbox and saved counts\n\
• `@bot help` — this message\n\
Add a :inbox_tray: reaction to a message to bookmark it.";

/// Handles an app mention event.
///
/// Mentions are commands, not tally input, so they run on their own task and
/// never block the event pipeline. Errors are logged, never propagated.
#[instrument(skip_all)]
pub fn handle_app_mention(user: UserId, channel: ChannelId, thread_ts: String, text: String, store: CounterStore, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = handle_app_mention_internal(user, channel, thread_ts, text, &store, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

#[instrument(skip_all)]
async fn handle_app_mention_internal(user: UserId, channel: ChannelId, thread_ts: String, text: String, store: &CounterStore, chat: &ChatClient) -> Void {
    // Strip the bot mention itself so it cannot match a command word.
    let command = text.replace(&format!("<@{}>", chat.bot_user_id()), "").to_lowercase();

    if command.contains("stats") {
        let record = store.snapshot().into_iter().find(|(id, _)| id == &user).map(|(_, record)| record).unwrap_or_default();

        let reply = format!("<@{}> inbox messages: {}, saved messages: {}", user, record.inbox_count, record.saved_count);

        chat.send_message(&channel, &thread_ts, &reply).await?;
    } else if command.contains("help") {
        chat.send_message(&channel, &thread_ts, HELP_TEXT).await?;
    } else {
        warn!("Unrecognized mention from {}; ignoring.", user);
    }

    Ok(())
}
