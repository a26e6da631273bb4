//! Application of classified events to the counter store.

use tracing::debug;

use crate::base::types::ClassifiedEvent;

use super::store::{CounterKind, CounterStore};

/// Applies one classified event to the store.
///
/// The only side effect is counter mutation; no I/O happens here.
pub fn apply(event: ClassifiedEvent, store: &CounterStore) {
    match event {
        ClassifiedEvent::NewMessage { sender, recipients } => {
            debug!("Message from {} reached {} recipients.", sender, recipients.len());

            for recipient in &recipients {
                store.increment(recipient, CounterKind::Inbox);
            }
        }
        ClassifiedEvent::Bookmark { owner } => {
            debug!("Bookmark credited to {}.", owner);

            store.increment(&owner, CounterKind::Saved);
        }
        ClassifiedEvent::Ignored => {}
    }
}
