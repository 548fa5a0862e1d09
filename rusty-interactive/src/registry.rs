//! Concurrent tables of live sessions (by message id) and ad-hoc waiters (by request id).

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, MessageMarker},
};
use uuid::Uuid;

use crate::callback::{FilteredDispatch, InteractiveCallback};
use crate::event::EventKind;
use crate::flags::InputType;

#[derive(Default)]
pub(crate) struct SessionRegistry {
    sessions: DashMap<Id<MessageMarker>, Arc<dyn InteractiveCallback>>,
    waiters: DashMap<Uuid, Arc<dyn FilteredDispatch>>,
}

impl SessionRegistry {
    /// Register a session. Returns `false` when the message already has one.
    pub fn insert_session(
        &self,
        message_id: Id<MessageMarker>,
        session: Arc<dyn InteractiveCallback>,
    ) -> bool {
        match self.sessions.entry(message_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(session);
                true
            }
        }
    }

    pub fn session(&self, message_id: Id<MessageMarker>) -> Option<Arc<dyn InteractiveCallback>> {
        self.sessions
            .get(&message_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Sessions in `channel_id` that accept plain message input.
    pub fn message_sessions_in(
        &self,
        channel_id: Id<ChannelMarker>,
    ) -> Vec<Arc<dyn InteractiveCallback>> {
        self.sessions
            .iter()
            .filter(|entry| {
                entry.channel_id() == channel_id
                    && entry.input_type().contains(InputType::MESSAGES)
            })
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Remove a session. Safe to call more than once.
    pub fn try_remove_session(&self, message_id: Id<MessageMarker>) -> bool {
        self.sessions.remove(&message_id).is_some()
    }

    /// Remove the session bound to `message_id` only if it is still `session`.
    pub fn remove_session_if_same(
        &self,
        message_id: Id<MessageMarker>,
        session: &Arc<dyn InteractiveCallback>,
    ) -> bool {
        self.sessions
            .remove_if(&message_id, |_, current| Arc::ptr_eq(current, session))
            .is_some()
    }

    pub fn insert_waiter(&self, id: Uuid, waiter: Arc<dyn FilteredDispatch>) {
        self.waiters.insert(id, waiter);
    }

    /// Waiters registered for events of `kind`.
    pub fn waiters_for(&self, kind: EventKind) -> Vec<Arc<dyn FilteredDispatch>> {
        self.waiters
            .iter()
            .filter(|entry| entry.kind() == kind)
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Remove a waiter. Safe to call more than once.
    pub fn try_remove_waiter(&self, id: &Uuid) -> bool {
        self.waiters.remove(id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }
}
