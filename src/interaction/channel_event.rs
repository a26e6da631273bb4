//! The tally pipeline: classify a channel event, apply it to the store.

use tracing::{debug, instrument};

use crate::{
    base::types::ChannelEvent,
    tally::{
        classify::{Classifier, MembershipResolver},
        store::CounterStore,
        update,
    },
};

/// Handles one channel event end to end.
///
/// Classification can involve a membership lookup against the chat platform,
/// so this is async; it never fails, since unresolvable events classify as
/// ignored. Callers await it inline to keep events in delivery order.
#[instrument(skip_all)]
pub async fn handle_channel_event<M>(event: ChannelEvent, classifier: &Classifier<M>, store: &CounterStore)
where
    M: MembershipResolver,
{
    debug!("Handling channel event: {}", serde_json::to_string(&event).unwrap_or_default());

    let classified = classifier.classify(event).await;

    update::apply(classified, store);
}
