//! Event handling and user interactions for tally-bot.
//!
//! This module provides functionality for handling chat events:
//! - Feeding normalized channel events through classification into the store.
//! - Answering `stats` and `help` app mentions.

pub mod app_mention;
pub mod channel_event;
