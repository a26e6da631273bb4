//! Service integrations for external APIs and clients.
//!
//! This module contains the chat service used by the tally-bot. It defines a
//! generic trait and a concrete Slack implementation, allowing the event
//! pipeline to be exercised against mocks in tests.

pub mod chat;
