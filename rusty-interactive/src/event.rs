//! Platform events normalised into the shapes the router and sessions work with.

use std::time::Duration;

use tokio::time::Instant;
use twilight_model::{
    application::interaction::{
        Interaction, InteractionData,
        modal::{ModalInteractionComponent, ModalInteractionData},
    },
    channel::{Message, message::MessageFlags},
    gateway::{GatewayReaction, event::Event},
    id::{
        Id,
        marker::{
            ApplicationMarker, ChannelMarker, GuildMarker, InteractionMarker, MessageMarker,
            UserMarker,
        },
    },
};

use crate::emote::Emote;
use crate::result::StopWitness;

/// How long an interaction token can be used to edit its response.
pub const INTERACTION_TOKEN_LIFETIME: Duration = Duration::from_secs(15 * 60);

/// A message created in a channel the bot can see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: Id<MessageMarker>,
    pub channel_id: Id<ChannelMarker>,
    pub guild_id: Option<Id<GuildMarker>>,
    pub author_id: Id<UserMarker>,
    pub author_is_bot: bool,
    pub content: String,
    /// The message this one replies to, if any.
    pub referenced_message_id: Option<Id<MessageMarker>>,
}

/// A reaction added to a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingReaction {
    pub message_id: Id<MessageMarker>,
    pub channel_id: Id<ChannelMarker>,
    pub guild_id: Option<Id<GuildMarker>>,
    pub user_id: Id<UserMarker>,
    pub emote: Emote,
}

/// The message a component interaction was attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceMessage {
    pub id: Id<MessageMarker>,
    pub channel_id: Id<ChannelMarker>,
    pub ephemeral: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionPayload {
    /// A button press or select-menu choice.
    Component {
        custom_id: String,
        values: Vec<String>,
    },
    /// A submitted modal, as `(field custom id, value)` pairs.
    Modal {
        custom_id: String,
        fields: Vec<(String, String)>,
    },
}

/// A component or modal-submit interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingInteraction {
    pub id: Id<InteractionMarker>,
    pub application_id: Id<ApplicationMarker>,
    pub token: String,
    pub user_id: Option<Id<UserMarker>>,
    pub channel_id: Option<Id<ChannelMarker>>,
    pub guild_id: Option<Id<GuildMarker>>,
    pub message: Option<SourceMessage>,
    pub payload: InteractionPayload,
    pub received_at: Instant,
}

impl IncomingInteraction {
    pub fn message_id(&self) -> Option<Id<MessageMarker>> {
        self.message.as_ref().map(|message| message.id)
    }

    pub fn custom_id(&self) -> &str {
        match &self.payload {
            InteractionPayload::Component { custom_id, .. }
            | InteractionPayload::Modal { custom_id, .. } => custom_id,
        }
    }

    /// Whether the response token can still be used to edit the response.
    pub fn token_is_valid(&self) -> bool {
        self.received_at.elapsed() < INTERACTION_TOKEN_LIFETIME
    }

    /// Value of a submitted modal field.
    pub fn modal_field(&self, field_custom_id: &str) -> Option<&str> {
        let InteractionPayload::Modal { fields, .. } = &self.payload else {
            return None;
        };

        fields
            .iter()
            .find(|(custom_id, _)| custom_id == field_custom_id)
            .map(|(_, value)| value.as_str())
    }

    fn from_interaction(interaction: &Interaction) -> Option<Self> {
        let payload = match interaction.data.as_ref()? {
            InteractionData::MessageComponent(data) => InteractionPayload::Component {
                custom_id: data.custom_id.clone(),
                values: data.values.clone(),
            },
            InteractionData::ModalSubmit(data) => InteractionPayload::Modal {
                custom_id: data.custom_id.clone(),
                fields: modal_fields(data),
            },
            _ => return None,
        };

        Some(Self {
            id: interaction.id,
            application_id: interaction.application_id,
            token: interaction.token.clone(),
            user_id: interaction.author_id(),
            channel_id: interaction.channel.as_ref().map(|channel| channel.id),
            guild_id: interaction.guild_id,
            message: interaction.message.as_ref().map(source_message),
            payload,
            received_at: Instant::now(),
        })
    }
}

fn source_message(message: &Message) -> SourceMessage {
    SourceMessage {
        id: message.id,
        channel_id: message.channel_id,
        ephemeral: message
            .flags
            .is_some_and(|flags| flags.contains(MessageFlags::EPHEMERAL)),
    }
}

fn modal_fields(data: &ModalInteractionData) -> Vec<(String, String)> {
    let mut fields = Vec::new();

    for component in &data.components {
        if let ModalInteractionComponent::ActionRow(row) = component {
            for nested in &row.components {
                if let ModalInteractionComponent::TextInput(text_input) = nested {
                    fields.push((text_input.custom_id.clone(), text_input.value.clone()));
                }
            }
        }
    }

    fields
}

/// Discriminant of [`InteractiveEvent`], used to match waiters against events cheaply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Message,
    Reaction,
    Interaction,
}

/// Every event the router accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractiveEvent {
    Message(IncomingMessage),
    Reaction(IncomingReaction),
    Interaction(IncomingInteraction),
}

impl InteractiveEvent {
    /// Normalise a gateway event. Events the engine does not consume map to `None`.
    pub fn from_gateway(event: &Event) -> Option<Self> {
        match event {
            Event::MessageCreate(message) => Some(Self::Message(IncomingMessage {
                id: message.id,
                channel_id: message.channel_id,
                guild_id: message.guild_id,
                author_id: message.author.id,
                author_is_bot: message.author.bot,
                content: message.content.clone(),
                referenced_message_id: message
                    .reference
                    .as_ref()
                    .and_then(|reference| reference.message_id),
            })),
            Event::ReactionAdd(reaction) => Some(Self::Reaction(reaction_from_gateway(reaction))),
            Event::InteractionCreate(interaction) => {
                IncomingInteraction::from_interaction(interaction).map(Self::Interaction)
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Message(_) => EventKind::Message,
            Self::Reaction(_) => EventKind::Reaction,
            Self::Interaction(_) => EventKind::Interaction,
        }
    }

    /// The user that produced the event.
    pub fn user_id(&self) -> Option<Id<UserMarker>> {
        match self {
            Self::Message(message) => Some(message.author_id),
            Self::Reaction(reaction) => Some(reaction.user_id),
            Self::Interaction(interaction) => interaction.user_id,
        }
    }
}

fn reaction_from_gateway(reaction: &GatewayReaction) -> IncomingReaction {
    IncomingReaction {
        message_id: reaction.message_id,
        channel_id: reaction.channel_id,
        guild_id: reaction.guild_id,
        user_id: reaction.user_id,
        emote: Emote::from(&reaction.emoji),
    }
}

/// An event shape that an ad-hoc waiter can be registered for.
pub trait WaitableEvent: Clone + Send + Sync + 'static {
    const KIND: EventKind;

    fn from_event(event: &InteractiveEvent) -> Option<Self>;

    fn into_witness(self) -> StopWitness;
}

impl WaitableEvent for IncomingMessage {
    const KIND: EventKind = EventKind::Message;

    fn from_event(event: &InteractiveEvent) -> Option<Self> {
        match event {
            InteractiveEvent::Message(message) => Some(message.clone()),
            _ => None,
        }
    }

    fn into_witness(self) -> StopWitness {
        StopWitness::Message(self)
    }
}

impl WaitableEvent for IncomingReaction {
    const KIND: EventKind = EventKind::Reaction;

    fn from_event(event: &InteractiveEvent) -> Option<Self> {
        match event {
            InteractiveEvent::Reaction(reaction) => Some(reaction.clone()),
            _ => None,
        }
    }

    fn into_witness(self) -> StopWitness {
        StopWitness::Reaction(self)
    }
}

impl WaitableEvent for IncomingInteraction {
    const KIND: EventKind = EventKind::Interaction;

    fn from_event(event: &InteractiveEvent) -> Option<Self> {
        match event {
            InteractiveEvent::Interaction(interaction) => Some(interaction.clone()),
            _ => None,
        }
    }

    fn into_witness(self) -> StopWitness {
        StopWitness::Interaction(self)
    }
}
