#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use tally_bot::{
    base::{
        config::SavedAttribution,
        types::{ChannelEvent, Res, UserId, Void},
    },
    interaction::channel_event::handle_channel_event,
    service::chat::{ChatClient, GenericChatClient},
    tally::{classify::Classifier, store::CounterStore},
};

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_user_id(&self) -> &str;
        async fn start(&self) -> Void;
        async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void;
        async fn members_of(&self, channel_id: &str) -> Res<Vec<UserId>>;
    }
}

/// A mock chat client whose channels all contain the given members.
fn get_mock_chat(members: &[&str]) -> MockChat {
    let members: Vec<UserId> = members.iter().map(|id| id.to_string()).collect();

    let mut mock = MockChat::new();

    mock.expect_bot_user_id().return_const("UBOT".to_string());
    mock.expect_start().returning(|| Ok(()));
    mock.expect_send_message().returning(|_, _, _| Ok(()));
    mock.expect_members_of().returning(move |_| Ok(members.clone()));

    mock
}

/// A mock chat client whose membership lookups always fail.
fn get_failing_chat() -> MockChat {
    let mut mock = MockChat::new();

    mock.expect_bot_user_id().return_const("UBOT".to_string());
    mock.expect_members_of().returning(|channel| Err(anyhow::anyhow!("no such channel: {}", channel)));

    mock
}

fn pipeline(chat: MockChat, attribution: SavedAttribution) -> (Classifier<ChatClient>, CounterStore) {
    let chat = ChatClient::new(Arc::new(chat));
    (Classifier::new(chat, "inbox_tray", attribution), CounterStore::new())
}

fn message(sender: &str, ts: &str) -> ChannelEvent {
    ChannelEvent::MessagePosted {
        sender: sender.to_string(),
        channel: "C1".to_string(),
        message: ts.to_string(),
    }
}

fn reaction(reactor: &str, ts: &str, name: &str) -> ChannelEvent {
    ChannelEvent::ReactionAdded {
        reactor: reactor.to_string(),
        message: ts.to_string(),
        reaction: name.to_string(),
    }
}

fn counts(store: &CounterStore, user: &str) -> (u64, u64) {
    store
        .snapshot()
        .into_iter()
        .find(|(id, _)| id == user)
        .map(|(_, record)| (record.inbox_count, record.saved_count))
        .unwrap_or((0, 0))
}

// Tests.

#[tokio::test]
async fn message_then_bookmark_scenario() {
    let (classifier, store) = pipeline(get_mock_chat(&["UA", "UB", "UC"]), SavedAttribution::MessageOwner);

    // A posts one message.
    handle_channel_event(message("UA", "1.0"), &classifier, &store).await;

    assert_eq!(counts(&store, "UA"), (0, 0));
    assert_eq!(counts(&store, "UB"), (1, 0));
    assert_eq!(counts(&store, "UC"), (1, 0));

    // B bookmarks A's message.
    handle_channel_event(reaction("UB", "1.0", "inbox_tray"), &classifier, &store).await;

    assert_eq!(counts(&store, "UA"), (0, 1));
    assert_eq!(counts(&store, "UB"), (1, 0));
    assert_eq!(counts(&store, "UC"), (1, 0));
}

#[tokio::test]
async fn inbox_counts_track_message_volume_per_sender() {
    let (classifier, store) = pipeline(get_mock_chat(&["UA", "UB", "UC"]), SavedAttribution::MessageOwner);

    for i in 0..3 {
        handle_channel_event(message("UA", &format!("1.{i}")), &classifier, &store).await;
    }

    assert_eq!(counts(&store, "UA"), (0, 0));
    assert_eq!(counts(&store, "UB"), (3, 0));
    assert_eq!(counts(&store, "UC"), (3, 0));
}

#[tokio::test]
async fn repeated_bookmarks_on_one_message_are_additive() {
    let (classifier, store) = pipeline(get_mock_chat(&["UA", "UB", "UC"]), SavedAttribution::MessageOwner);

    handle_channel_event(message("UA", "1.0"), &classifier, &store).await;
    handle_channel_event(reaction("UB", "1.0", "inbox_tray"), &classifier, &store).await;
    handle_channel_event(reaction("UC", "1.0", "inbox_tray"), &classifier, &store).await;

    assert_eq!(counts(&store, "UA").1, 2);
}

#[tokio::test]
async fn reactor_attribution_credits_the_reacting_user() {
    let (classifier, store) = pipeline(get_mock_chat(&["UA", "UB"]), SavedAttribution::Reactor);

    handle_channel_event(message("UA", "1.0"), &classifier, &store).await;
    handle_channel_event(reaction("UB", "1.0", "inbox_tray"), &classifier, &store).await;

    assert_eq!(counts(&store, "UA").1, 0);
    assert_eq!(counts(&store, "UB").1, 1);
}

#[tokio::test]
async fn non_bookmark_reactions_change_nothing() {
    let (classifier, store) = pipeline(get_mock_chat(&["UA", "UB"]), SavedAttribution::MessageOwner);

    handle_channel_event(message("UA", "1.0"), &classifier, &store).await;
    let before = store.snapshot();

    handle_channel_event(reaction("UB", "1.0", "thumbsup"), &classifier, &store).await;

    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn unresolvable_membership_leaves_counters_unchanged() {
    let (classifier, store) = pipeline(get_failing_chat(), SavedAttribution::MessageOwner);

    handle_channel_event(message("UA", "1.0"), &classifier, &store).await;

    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn concurrent_messages_to_one_recipient_both_land() {
    let (classifier, store) = pipeline(get_mock_chat(&["UA", "UB", "UC"]), SavedAttribution::MessageOwner);

    tokio::join!(
        handle_channel_event(message("UA", "1.0"), &classifier, &store),
        handle_channel_event(message("UB", "2.0"), &classifier, &store),
    );

    assert_eq!(counts(&store, "UC").0, 2);
}

#[tokio::test]
async fn stats_mention_replies_with_the_callers_counters() {
    use tally_bot::interaction::app_mention::handle_app_mention;

    let (classifier, store) = pipeline(get_mock_chat(&["UA", "UB"]), SavedAttribution::MessageOwner);
    handle_channel_event(message("UB", "1.0"), &classifier, &store).await;

    // The reply goes through a spawned task, so signal completion via a channel.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut mock = MockChat::new();
    mock.expect_bot_user_id().return_const("UBOT".to_string());
    mock.expect_send_message()
        .withf(|channel, _, text| channel == "C1" && text.contains("inbox messages: 1") && text.contains("saved messages: 0"))
        .returning(move |_, _, _| {
            tx.send(()).ok();
            Ok(())
        });

    handle_app_mention(
        "UA".to_string(),
        "C1".to_string(),
        "1.0".to_string(),
        "<@UBOT> stats".to_string(),
        store.clone(),
        ChatClient::new(Arc::new(mock)),
    );

    tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv()).await.expect("no reply sent").unwrap();
}

#[tokio::test]
async fn help_mention_replies_with_usage() {
    use tally_bot::interaction::app_mention::handle_app_mention;

    let store = CounterStore::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut mock = MockChat::new();
    mock.expect_bot_user_id().return_const("UBOT".to_string());
    mock.expect_send_message()
        .withf(|_, _, text| text.contains("stats") && text.contains("help"))
        .returning(move |_, _, _| {
            tx.send(()).ok();
            Ok(())
        });

    handle_app_mention(
        "UA".to_string(),
        "C1".to_string(),
        "1.0".to_string(),
        "<@UBOT> help".to_string(),
        store,
        ChatClient::new(Arc::new(mock)),
    );

    tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv()).await.expect("no reply sent").unwrap();
}
