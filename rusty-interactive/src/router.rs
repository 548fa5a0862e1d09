//! Fans incoming events out to the session owning the target message and to matching waiters.

use std::sync::Arc;

use tracing::error;

use crate::callback::InteractiveCallback;
use crate::event::InteractiveEvent;
use crate::registry::SessionRegistry;

/// Dispatch `event` to every interested subscriber without waiting for any of them.
///
/// Each subscriber runs in its own task; failures are logged there and never reach the caller.
pub(crate) fn route(registry: &SessionRegistry, event: InteractiveEvent) {
    let sessions = target_sessions(registry, &event);
    let waiters = registry.waiters_for(event.kind());

    if sessions.is_empty() && waiters.is_empty() {
        return;
    }

    let event = Arc::new(event);

    for session in sessions {
        let event = Arc::clone(&event);
        tokio::spawn(async move {
            if let Err(source) = session.execute(&event).await {
                error!(?source, kind = ?event.kind(), "interactive session failed to handle event");
            }
        });
    }

    for waiter in waiters {
        let event = Arc::clone(&event);
        tokio::spawn(async move {
            if let Err(source) = waiter.dispatch(&event).await {
                error!(?source, kind = ?event.kind(), "event waiter failed to handle event");
            }
        });
    }
}

fn target_sessions(
    registry: &SessionRegistry,
    event: &InteractiveEvent,
) -> Vec<Arc<dyn InteractiveCallback>> {
    match event {
        InteractiveEvent::Message(message) => match message
            .referenced_message_id
            .and_then(|target| registry.session(target))
        {
            Some(session) => vec![session],
            None => registry.message_sessions_in(message.channel_id),
        },
        InteractiveEvent::Reaction(reaction) => {
            registry.session(reaction.message_id).into_iter().collect()
        }
        InteractiveEvent::Interaction(interaction) => interaction
            .message_id()
            .and_then(|message_id| registry.session(message_id))
            .into_iter()
            .collect(),
    }
}
