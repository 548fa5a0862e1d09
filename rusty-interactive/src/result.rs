use std::time::Duration;

use twilight_model::id::{Id, marker::UserMarker};

use crate::event::{IncomingInteraction, IncomingMessage, IncomingReaction};
use crate::http::MessageHandle;

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractiveStatus {
    Success,
    Timeout,
    Canceled,
}

/// The single value a session or waiter resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Timeout,
    Canceled,
}

impl<T> Outcome<T> {
    pub fn status(&self) -> InteractiveStatus {
        match self {
            Self::Success(_) => InteractiveStatus::Success,
            Self::Timeout => InteractiveStatus::Timeout,
            Self::Canceled => InteractiveStatus::Canceled,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// The input that ended a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StopWitness {
    /// Nothing the user did: the timer fired or the caller canceled.
    #[default]
    None,
    Message(IncomingMessage),
    Reaction(IncomingReaction),
    Interaction(IncomingInteraction),
}

impl StopWitness {
    /// The user responsible for ending the session.
    pub fn user_id(&self) -> Option<Id<UserMarker>> {
        match self {
            Self::None => None,
            Self::Message(message) => Some(message.author_id),
            Self::Reaction(reaction) => Some(reaction.user_id),
            Self::Interaction(interaction) => interaction.user_id,
        }
    }

    pub fn interaction(&self) -> Option<&IncomingInteraction> {
        match self {
            Self::Interaction(interaction) => Some(interaction),
            _ => None,
        }
    }
}

/// Result of a selection or an ad-hoc wait.
///
/// A `Success` always carries its value; `Timeout` and `Canceled` never do.
#[derive(Clone, Debug)]
pub struct InteractiveResult<T> {
    outcome: Outcome<T>,
    elapsed: Duration,
    witness: StopWitness,
    message: Option<MessageHandle>,
}

impl<T> InteractiveResult<T> {
    pub(crate) fn new(
        outcome: Outcome<T>,
        elapsed: Duration,
        witness: StopWitness,
        message: Option<MessageHandle>,
    ) -> Self {
        Self {
            outcome,
            elapsed,
            witness,
            message,
        }
    }

    pub fn status(&self) -> InteractiveStatus {
        self.outcome.status()
    }

    pub fn is_success(&self) -> bool {
        self.status() == InteractiveStatus::Success
    }

    pub fn value(&self) -> Option<&T> {
        self.outcome.value()
    }

    pub fn into_value(self) -> Option<T> {
        self.outcome.into_value()
    }

    pub fn outcome(&self) -> &Outcome<T> {
        &self.outcome
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn witness(&self) -> &StopWitness {
        &self.witness
    }

    pub fn user_id(&self) -> Option<Id<UserMarker>> {
        self.witness.user_id()
    }

    /// The widget message, for selections. Ad-hoc waits have none.
    pub fn message(&self) -> Option<&MessageHandle> {
        self.message.as_ref()
    }
}

/// Result of a paginator session. Paginators end only by timeout or cancellation.
#[derive(Clone, Debug)]
pub struct PaginatorResult {
    pub status: InteractiveStatus,
    pub elapsed: Duration,
    pub witness: StopWitness,
    pub current_page_index: usize,
    pub message: MessageHandle,
}
