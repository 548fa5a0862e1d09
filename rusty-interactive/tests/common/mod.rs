#![allow(dead_code)]

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use async_trait::async_trait;
use tokio::time::Instant;
use twilight_model::{
    channel::message::component::Component,
    http::interaction::{InteractionResponse, InteractionResponseType},
    id::{
        Id,
        marker::{ChannelMarker, MessageMarker, UserMarker},
    },
};

use rusty_interactive::{
    Emote, IncomingInteraction, IncomingMessage, IncomingReaction, InteractionPayload,
    InteractiveHttp, MessageHandle, Page, PlatformError, SourceMessage,
};

/// Id given to the first message the fake sends; later ones count up from here.
pub const FIRST_MESSAGE_ID: u64 = 1000;
pub const CHANNEL_ID: u64 = 10;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateMessage {
        channel_id: u64,
        content: Option<String>,
        components: Vec<Component>,
    },
    UpdateMessage {
        message_id: u64,
        content: Option<String>,
        components: Option<Vec<Component>>,
    },
    DeleteMessage {
        message_id: u64,
    },
    DeleteUserMessage {
        message_id: u64,
    },
    CreateReaction {
        message_id: u64,
        emote: String,
    },
    DeleteReaction {
        message_id: u64,
        emote: String,
        user_id: u64,
    },
    DeleteAllReactions {
        message_id: u64,
    },
    CreateResponse {
        interaction_id: u64,
        kind: InteractionResponseType,
        content: Option<String>,
    },
    UpdateResponse {
        interaction_id: u64,
        content: Option<String>,
        components: Option<Vec<Component>>,
    },
    DeleteResponse {
        interaction_id: u64,
    },
}

#[derive(Clone, Copy, Debug)]
pub enum Failure {
    NotFound,
    Other,
}

/// In-memory platform that records every outbound call.
pub struct RecordingHttp {
    calls: Mutex<Vec<Call>>,
    next_message_id: AtomicU64,
    failure: Mutex<Option<Failure>>,
    reaction_failure: Mutex<Option<Failure>>,
    can_manage: AtomicBool,
}

impl Default for RecordingHttp {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_message_id: AtomicU64::new(FIRST_MESSAGE_ID),
            failure: Mutex::new(None),
            reaction_failure: Mutex::new(None),
            can_manage: AtomicBool::new(false),
        }
    }
}

impl RecordingHttp {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn clear(&self) {
        self.calls.lock().expect("calls lock").clear();
    }

    /// Make every following call fail.
    pub fn fail_with(&self, failure: Failure) {
        *self.failure.lock().expect("failure lock") = Some(failure);
    }

    /// Make only reaction priming fail.
    pub fn fail_reactions_with(&self, failure: Failure) {
        *self.reaction_failure.lock().expect("failure lock") = Some(failure);
    }

    pub fn set_can_manage(&self, can_manage: bool) {
        self.can_manage.store(can_manage, Ordering::SeqCst);
    }

    fn record(&self, call: Call) -> Result<(), PlatformError> {
        let failure = *self.failure.lock().expect("failure lock");
        self.record_failing(call, failure)
    }

    fn record_failing(&self, call: Call, failure: Option<Failure>) -> Result<(), PlatformError> {
        self.calls.lock().expect("calls lock").push(call);

        match failure {
            Some(Failure::NotFound) => Err(PlatformError::NotFound(anyhow::anyhow!(
                "unknown message"
            ))),
            Some(Failure::Other) => Err(PlatformError::Other(anyhow::anyhow!(
                "internal server error"
            ))),
            None => Ok(()),
        }
    }

    fn handle(&self, channel_id: Id<ChannelMarker>) -> MessageHandle {
        MessageHandle {
            id: Id::new(self.next_message_id.fetch_add(1, Ordering::SeqCst)),
            channel_id,
            guild_id: None,
            ephemeral: false,
            origin: None,
        }
    }
}

#[async_trait]
impl InteractiveHttp for RecordingHttp {
    async fn create_message(
        &self,
        channel_id: Id<ChannelMarker>,
        page: &Page,
        components: &[Component],
    ) -> Result<MessageHandle, PlatformError> {
        self.record(Call::CreateMessage {
            channel_id: channel_id.get(),
            content: page.content.clone(),
            components: components.to_vec(),
        })?;

        Ok(self.handle(channel_id))
    }

    async fn update_message(
        &self,
        message: &MessageHandle,
        page: Option<&Page>,
        components: Option<&[Component]>,
    ) -> Result<(), PlatformError> {
        self.record(Call::UpdateMessage {
            message_id: message.id.get(),
            content: page.and_then(|page| page.content.clone()),
            components: components.map(<[Component]>::to_vec),
        })
    }

    async fn delete_message(&self, message: &MessageHandle) -> Result<(), PlatformError> {
        self.record(Call::DeleteMessage {
            message_id: message.id.get(),
        })
    }

    async fn delete_user_message(
        &self,
        _channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> Result<(), PlatformError> {
        self.record(Call::DeleteUserMessage {
            message_id: message_id.get(),
        })
    }

    async fn create_reaction(
        &self,
        message: &MessageHandle,
        emote: &Emote,
    ) -> Result<(), PlatformError> {
        let failure = (*self.reaction_failure.lock().expect("failure lock"))
            .or(*self.failure.lock().expect("failure lock"));

        self.record_failing(
            Call::CreateReaction {
                message_id: message.id.get(),
                emote: emote.to_string(),
            },
            failure,
        )
    }

    async fn delete_reaction(
        &self,
        message: &MessageHandle,
        emote: &Emote,
        user_id: Id<UserMarker>,
    ) -> Result<(), PlatformError> {
        self.record(Call::DeleteReaction {
            message_id: message.id.get(),
            emote: emote.to_string(),
            user_id: user_id.get(),
        })
    }

    async fn delete_all_reactions(&self, message: &MessageHandle) -> Result<(), PlatformError> {
        self.record(Call::DeleteAllReactions {
            message_id: message.id.get(),
        })
    }

    async fn create_response(
        &self,
        interaction: &IncomingInteraction,
        response: &InteractionResponse,
    ) -> Result<(), PlatformError> {
        self.record(Call::CreateResponse {
            interaction_id: interaction.id.get(),
            kind: response.kind,
            content: response
                .data
                .as_ref()
                .and_then(|data| data.content.clone()),
        })
    }

    async fn update_response(
        &self,
        interaction: &IncomingInteraction,
        page: Option<&Page>,
        components: Option<&[Component]>,
    ) -> Result<(), PlatformError> {
        self.record(Call::UpdateResponse {
            interaction_id: interaction.id.get(),
            content: page.and_then(|page| page.content.clone()),
            components: components.map(<[Component]>::to_vec),
        })
    }

    async fn delete_response(
        &self,
        interaction: &IncomingInteraction,
    ) -> Result<(), PlatformError> {
        self.record(Call::DeleteResponse {
            interaction_id: interaction.id.get(),
        })
    }

    async fn response_message(
        &self,
        interaction: &IncomingInteraction,
    ) -> Result<MessageHandle, PlatformError> {
        let channel_id = interaction.channel_id.unwrap_or(Id::new(CHANNEL_ID));
        let mut handle = self.handle(channel_id);
        handle.origin = Some(interaction.clone());

        Ok(handle)
    }

    async fn can_manage_messages(&self, _message: &MessageHandle) -> Result<bool, PlatformError> {
        Ok(self.can_manage.load(Ordering::SeqCst))
    }
}

/// Let spawned dispatch tasks run without letting the paused clock move.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// Yield until `condition` holds.
pub async fn until(condition: impl Fn() -> bool) {
    while !condition() {
        tokio::task::yield_now().await;
    }
}

pub fn message_handle(id: u64) -> MessageHandle {
    MessageHandle {
        id: Id::new(id),
        channel_id: Id::new(CHANNEL_ID),
        guild_id: None,
        ephemeral: false,
        origin: None,
    }
}

pub fn reaction(message_id: u64, user_id: u64, emote: &str) -> IncomingReaction {
    IncomingReaction {
        message_id: Id::new(message_id),
        channel_id: Id::new(CHANNEL_ID),
        guild_id: None,
        user_id: Id::new(user_id),
        emote: Emote::unicode(emote),
    }
}

pub fn message(id: u64, user_id: u64, content: &str) -> IncomingMessage {
    IncomingMessage {
        id: Id::new(id),
        channel_id: Id::new(CHANNEL_ID),
        guild_id: None,
        author_id: Id::new(user_id),
        author_is_bot: false,
        content: content.to_owned(),
        referenced_message_id: None,
    }
}

pub fn button_press(
    interaction_id: u64,
    user_id: u64,
    message_id: u64,
    custom_id: &str,
) -> IncomingInteraction {
    IncomingInteraction {
        id: Id::new(interaction_id),
        application_id: Id::new(1),
        token: format!("token-{interaction_id}"),
        user_id: Some(Id::new(user_id)),
        channel_id: Some(Id::new(CHANNEL_ID)),
        guild_id: None,
        message: Some(SourceMessage {
            id: Id::new(message_id),
            channel_id: Id::new(CHANNEL_ID),
            ephemeral: false,
        }),
        payload: InteractionPayload::Component {
            custom_id: custom_id.to_owned(),
            values: Vec::new(),
        },
        received_at: Instant::now(),
    }
}
