//! Sessions: one widget bound to one sent message and one timeout source.

mod filtered;
mod paginator;
mod selection;

use async_trait::async_trait;
use twilight_model::{
    channel::message::MessageFlags,
    http::interaction::{InteractionResponse, InteractionResponseType},
    id::{Id, marker::ChannelMarker},
};
use twilight_util::builder::InteractionResponseDataBuilder;

use crate::error::{IgnoreNotFound, PlatformError};
use crate::event::{IncomingInteraction, IncomingMessage, IncomingReaction, InteractiveEvent};
use crate::flags::{InputType, RestrictedInputBehavior};
use crate::http::InteractiveHttp;
use crate::page::Page;

pub use filtered::{EventAction, EventFilter};
pub(crate) use filtered::{FilteredDispatch, wait_for_event};
pub(crate) use paginator::PaginatorCallback;
pub(crate) use selection::SelectionCallback;

/// Ephemeral reply for users outside a widget's allow-list.
pub const RESTRICTED_INPUT_MESSAGE: &str = "This interactive message belongs to another user.";

/// A registered widget session. Irrelevant or malformed events are ignored, never errors.
#[async_trait]
pub(crate) trait InteractiveCallback: Send + Sync {
    fn channel_id(&self) -> Id<ChannelMarker>;

    fn input_type(&self) -> InputType;

    async fn execute_message(&self, _message: &IncomingMessage) -> anyhow::Result<()> {
        Ok(())
    }

    async fn execute_reaction(&self, reaction: &IncomingReaction) -> anyhow::Result<()>;

    async fn execute_interaction(&self, interaction: &IncomingInteraction) -> anyhow::Result<()>;

    /// Resolve the session as canceled. Returns `false` when it had already ended.
    fn cancel(&self) -> bool;

    async fn execute(&self, event: &InteractiveEvent) -> anyhow::Result<()> {
        match event {
            InteractiveEvent::Message(message) => self.execute_message(message).await,
            InteractiveEvent::Reaction(reaction) => self.execute_reaction(reaction).await,
            InteractiveEvent::Interaction(interaction) => {
                self.execute_interaction(interaction).await
            }
        }
    }
}

/// Answer a component interaction from a user who is not allowed to use the widget.
pub(crate) async fn answer_restricted(
    http: &dyn InteractiveHttp,
    interaction: &IncomingInteraction,
    behavior: RestrictedInputBehavior,
    restricted_page: Option<&Page>,
) -> Result<(), PlatformError> {
    let response = match behavior {
        RestrictedInputBehavior::Ignore => return Ok(()),
        RestrictedInputBehavior::Defer => InteractionResponse {
            kind: InteractionResponseType::DeferredUpdateMessage,
            data: None,
        },
        RestrictedInputBehavior::SendMessage => {
            let mut data = InteractionResponseDataBuilder::new().flags(MessageFlags::EPHEMERAL);
            match restricted_page {
                Some(page) => {
                    if let Some(content) = page.content.as_deref() {
                        data = data.content(content);
                    }
                    data = data.embeds(page.embeds.clone());
                }
                None => data = data.content(RESTRICTED_INPUT_MESSAGE),
            }
            InteractionResponse {
                kind: InteractionResponseType::ChannelMessageWithSource,
                data: Some(data.build()),
            }
        }
    };

    http.create_response(interaction, &response)
        .await
        .ignore_not_found()
}

/// Acknowledge a component interaction without changing the message.
pub(crate) async fn defer_interaction(
    http: &dyn InteractiveHttp,
    interaction: &IncomingInteraction,
) -> Result<(), PlatformError> {
    let response = InteractionResponse {
        kind: InteractionResponseType::DeferredUpdateMessage,
        data: None,
    };

    http.create_response(interaction, &response)
        .await
        .ignore_not_found()
}
