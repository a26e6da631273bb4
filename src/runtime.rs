//! Runtime services and shared state for the tally-bot.

use std::time::Duration;

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::chat::ChatClient,
    tally::{
        report::{Reporter, StdoutSink},
        store::CounterStore,
    },
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the counter store, and the chat
/// client. It is designed to be trivially cloneable, allowing it to be passed
/// around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The shared counter store.
    pub store: CounterStore,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // The store is the only shared mutable state; it is constructed here
        // and handed to everything that needs it.
        let store = CounterStore::new();

        // Initialize the slack client.
        let chat = ChatClient::slack(&config, store.clone()).await?;

        Ok(Self { config, store, chat })
    }

    /// Spawns the periodic reporter, then runs the chat listener until
    /// process shutdown. Neither path blocks the other; they share only the
    /// counter store.
    pub async fn start(&self) -> Void {
        let reporter = Reporter::new(self.store.clone(), Duration::from_secs(self.config.report_interval_secs));
        tokio::spawn(reporter.run(StdoutSink));

        self.chat.start().await
    }
}
