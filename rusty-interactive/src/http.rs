//! Outbound platform calls used by sessions and the stop-action applier.

use async_trait::async_trait;
use twilight_http::{
    Client,
    api_error::ApiError,
    error::ErrorType,
    request::channel::reaction::RequestReactionType,
    response::DeserializeBodyError,
};
use twilight_model::{
    channel::{Message, message::MessageFlags, message::component::Component},
    guild::Permissions,
    http::interaction::InteractionResponse,
    id::{
        Id,
        marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker},
    },
};

use crate::emote::Emote;
use crate::error::PlatformError;
use crate::event::IncomingInteraction;
use crate::page::Page;

/// Discord error codes meaning the target is gone.
const UNKNOWN_MESSAGE: u64 = 10008;
const UNKNOWN_WEBHOOK: u64 = 10015;
const UNKNOWN_INTERACTION: u64 = 10062;

/// Enough identity to modify a message the bot sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageHandle {
    pub id: Id<MessageMarker>,
    pub channel_id: Id<ChannelMarker>,
    pub guild_id: Option<Id<GuildMarker>>,
    /// Ephemeral messages cannot be edited or deleted through the channel endpoints.
    pub ephemeral: bool,
    /// The interaction whose original response this message is.
    pub origin: Option<IncomingInteraction>,
}

impl MessageHandle {
    fn from_message(message: &Message, origin: Option<IncomingInteraction>) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
            guild_id: message.guild_id,
            ephemeral: message
                .flags
                .is_some_and(|flags| flags.contains(MessageFlags::EPHEMERAL)),
            origin,
        }
    }
}

/// The platform operations the engine needs, implemented for [`twilight_http::Client`].
#[async_trait]
pub trait InteractiveHttp: Send + Sync {
    async fn create_message(
        &self,
        channel_id: Id<ChannelMarker>,
        page: &Page,
        components: &[Component],
    ) -> Result<MessageHandle, PlatformError>;

    /// Edit a message. `None` leaves that part untouched.
    async fn update_message(
        &self,
        message: &MessageHandle,
        page: Option<&Page>,
        components: Option<&[Component]>,
    ) -> Result<(), PlatformError>;

    async fn delete_message(&self, message: &MessageHandle) -> Result<(), PlatformError>;

    /// Delete a message the bot did not send, such as a user's jump input.
    async fn delete_user_message(
        &self,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> Result<(), PlatformError>;

    async fn create_reaction(
        &self,
        message: &MessageHandle,
        emote: &Emote,
    ) -> Result<(), PlatformError>;

    async fn delete_reaction(
        &self,
        message: &MessageHandle,
        emote: &Emote,
        user_id: Id<UserMarker>,
    ) -> Result<(), PlatformError>;

    async fn delete_all_reactions(&self, message: &MessageHandle) -> Result<(), PlatformError>;

    async fn create_response(
        &self,
        interaction: &IncomingInteraction,
        response: &InteractionResponse,
    ) -> Result<(), PlatformError>;

    /// Edit the message an interaction responded to (or was attached to).
    async fn update_response(
        &self,
        interaction: &IncomingInteraction,
        page: Option<&Page>,
        components: Option<&[Component]>,
    ) -> Result<(), PlatformError>;

    async fn delete_response(&self, interaction: &IncomingInteraction)
    -> Result<(), PlatformError>;

    /// Fetch the message created by an interaction's original response.
    async fn response_message(
        &self,
        interaction: &IncomingInteraction,
    ) -> Result<MessageHandle, PlatformError>;

    /// Whether the bot may manage other users' messages and reactions where `message` lives.
    async fn can_manage_messages(&self, message: &MessageHandle) -> Result<bool, PlatformError>;
}

fn is_unknown_target(code: u64) -> bool {
    matches!(code, UNKNOWN_MESSAGE | UNKNOWN_WEBHOOK | UNKNOWN_INTERACTION)
}

impl From<twilight_http::Error> for PlatformError {
    fn from(source: twilight_http::Error) -> Self {
        let not_found = match source.kind() {
            ErrorType::Response { error, status, .. } => {
                status.get() == 404
                    || matches!(error, ApiError::General(err) if is_unknown_target(err.code))
            }
            _ => false,
        };

        if not_found {
            Self::NotFound(source.into())
        } else {
            Self::Other(source.into())
        }
    }
}

impl From<DeserializeBodyError> for PlatformError {
    fn from(source: DeserializeBodyError) -> Self {
        Self::Other(source.into())
    }
}

fn request_reaction(emote: &Emote) -> RequestReactionType<'_> {
    match emote {
        Emote::Unicode(name) => RequestReactionType::Unicode { name },
        Emote::Custom { id, name, .. } => RequestReactionType::Custom {
            id: *id,
            name: name.as_deref(),
        },
    }
}

#[async_trait]
impl InteractiveHttp for Client {
    async fn create_message(
        &self,
        channel_id: Id<ChannelMarker>,
        page: &Page,
        components: &[Component],
    ) -> Result<MessageHandle, PlatformError> {
        let mut request = self
            .create_message(channel_id)
            .embeds(&page.embeds)
            .components(components);
        if let Some(content) = page.content.as_deref() {
            request = request.content(content);
        }

        let message = request.await?.model().await?;

        Ok(MessageHandle::from_message(&message, None))
    }

    async fn update_message(
        &self,
        message: &MessageHandle,
        page: Option<&Page>,
        components: Option<&[Component]>,
    ) -> Result<(), PlatformError> {
        let mut request = self.update_message(message.channel_id, message.id);
        if let Some(page) = page {
            request = request
                .content(page.content.as_deref())
                .embeds(Some(&page.embeds));
        }
        if let Some(components) = components {
            request = request.components(Some(components));
        }

        request.await?;

        Ok(())
    }

    async fn delete_message(&self, message: &MessageHandle) -> Result<(), PlatformError> {
        self.delete_message(message.channel_id, message.id).await?;

        Ok(())
    }

    async fn delete_user_message(
        &self,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> Result<(), PlatformError> {
        self.delete_message(channel_id, message_id).await?;

        Ok(())
    }

    async fn create_reaction(
        &self,
        message: &MessageHandle,
        emote: &Emote,
    ) -> Result<(), PlatformError> {
        self.create_reaction(message.channel_id, message.id, &request_reaction(emote))
            .await?;

        Ok(())
    }

    async fn delete_reaction(
        &self,
        message: &MessageHandle,
        emote: &Emote,
        user_id: Id<UserMarker>,
    ) -> Result<(), PlatformError> {
        self.delete_reaction(
            message.channel_id,
            message.id,
            &request_reaction(emote),
            user_id,
        )
        .await?;

        Ok(())
    }

    async fn delete_all_reactions(&self, message: &MessageHandle) -> Result<(), PlatformError> {
        self.delete_all_reactions(message.channel_id, message.id)
            .await?;

        Ok(())
    }

    async fn create_response(
        &self,
        interaction: &IncomingInteraction,
        response: &InteractionResponse,
    ) -> Result<(), PlatformError> {
        self.interaction(interaction.application_id)
            .create_response(interaction.id, &interaction.token, response)
            .await?;

        Ok(())
    }

    async fn update_response(
        &self,
        interaction: &IncomingInteraction,
        page: Option<&Page>,
        components: Option<&[Component]>,
    ) -> Result<(), PlatformError> {
        let client = self.interaction(interaction.application_id);
        let mut request = client.update_response(&interaction.token);
        if let Some(page) = page {
            request = request
                .content(page.content.as_deref())
                .embeds(Some(&page.embeds));
        }
        if let Some(components) = components {
            request = request.components(Some(components));
        }

        request.await?;

        Ok(())
    }

    async fn delete_response(
        &self,
        interaction: &IncomingInteraction,
    ) -> Result<(), PlatformError> {
        self.interaction(interaction.application_id)
            .delete_response(&interaction.token)
            .await?;

        Ok(())
    }

    async fn response_message(
        &self,
        interaction: &IncomingInteraction,
    ) -> Result<MessageHandle, PlatformError> {
        let message = self
            .interaction(interaction.application_id)
            .response(&interaction.token)
            .await?
            .model()
            .await?;

        let mut handle = MessageHandle::from_message(&message, Some(interaction.clone()));
        handle.guild_id = handle.guild_id.or(interaction.guild_id);

        Ok(handle)
    }

    async fn can_manage_messages(&self, message: &MessageHandle) -> Result<bool, PlatformError> {
        let Some(guild_id) = message.guild_id else {
            return Ok(false);
        };

        rusty_utils::permissions::current_user_has_permission(
            self,
            guild_id,
            Permissions::MANAGE_MESSAGES,
        )
        .await
        .map_err(PlatformError::Other)
    }
}
