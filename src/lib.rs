//! Library root for `tally-bot`.
//!
//! Tally-bot is a Slack channel listener that keeps per-user message counts:
//! - How many messages landed in each member's "inbox" (posted by someone else)
//! - How many messages each user bookmarked with the 📥 reaction
//!
//! Every few seconds the current tally is written to the operator log stream.
//!
//! The bot integrates with Slack over socket mode for events; everything else
//! is in-process state. The architecture is built around extensible traits
//! that allow for different implementations of each service.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;
pub mod tally;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the tally-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the counter store and chat client
/// - Starts the reporter and the main event loop
pub async fn start(config: Config) -> Void {
    info!("Starting tally-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
