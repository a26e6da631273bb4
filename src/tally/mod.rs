//! The event-driven tally engine.
//!
//! This module contains the only state-bearing parts of the application:
//! - The counter store holding per-user inbox and saved counts.
//! - The classifier that turns raw channel events into tally updates.
//! - The updater that applies classified events to the store.
//! - The reporter that periodically emits the current tally.

pub mod classify;
pub mod report;
pub mod store;
pub mod update;
