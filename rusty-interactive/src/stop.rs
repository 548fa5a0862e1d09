//! Final message mutation applied once a session reaches a terminal state.

use tracing::debug;
use twilight_model::{
    channel::message::component::Component,
    http::interaction::{InteractionResponse, InteractionResponseType},
};
use twilight_util::builder::InteractionResponseDataBuilder;

use crate::callback::defer_interaction;
use crate::error::{IgnoreNotFound, PlatformError};
use crate::event::IncomingInteraction;
use crate::flags::{ActionOnStop, InputType};
use crate::http::{InteractiveHttp, MessageHandle};
use crate::page::Page;
use crate::result::InteractiveStatus;

/// Everything the applier needs to know about a stopped session.
#[derive(Clone, Debug)]
pub struct StopContext<'a> {
    pub message: &'a MessageHandle,
    pub status: InteractiveStatus,
    pub action: ActionOnStop,
    /// Replacement page for this status, if the widget configures one.
    pub stop_page: Option<Page>,
    /// The widget's components rendered disabled.
    pub disabled_components: Vec<Component>,
    pub input_type: InputType,
    /// The interaction that ended the session, still waiting for a response.
    pub stop_interaction: Option<&'a IncomingInteraction>,
    /// The last interaction used to update the message.
    pub last_interaction: Option<&'a IncomingInteraction>,
    /// Acknowledge a stop interaction even when nothing is changed.
    pub defer_unacted: bool,
}

/// Apply the stop policy. "Target no longer exists" failures count as success.
pub async fn apply_stop_action(
    http: &dyn InteractiveHttp,
    ctx: StopContext<'_>,
) -> Result<(), PlatformError> {
    debug!(
        message_id = ctx.message.id.get(),
        status = ?ctx.status,
        action = ?ctx.action,
        "applying stop action"
    );

    if ctx.action.contains(ActionOnStop::DELETE_MESSAGE) {
        return delete_message(http, &ctx).await;
    }

    let page = ctx
        .action
        .contains(ActionOnStop::MODIFY_MESSAGE)
        .then_some(ctx.stop_page.as_ref())
        .flatten();

    let components = if ctx.action.contains(ActionOnStop::DELETE_INPUT) {
        Some(Vec::new())
    } else if ctx.action.contains(ActionOnStop::DISABLE_INPUT) {
        Some(ctx.disabled_components.clone())
    } else {
        None
    };

    if page.is_none() && components.is_none() {
        if let Some(interaction) = ctx.stop_interaction
            && ctx.defer_unacted
        {
            defer_interaction(http, interaction).await?;
        }
        return Ok(());
    }

    modify_message(http, &ctx, page, components.as_deref()).await?;

    if ctx.action.contains(ActionOnStop::DELETE_INPUT)
        && ctx.input_type.contains(InputType::REACTIONS)
        && !ctx.message.ephemeral
    {
        clear_reactions(http, ctx.message).await?;
    }

    Ok(())
}

async fn delete_message(
    http: &dyn InteractiveHttp,
    ctx: &StopContext<'_>,
) -> Result<(), PlatformError> {
    if !ctx.message.ephemeral {
        return http.delete_message(ctx.message).await.ignore_not_found();
    }

    // Ephemeral messages cannot go through the channel endpoint.
    if let Some(interaction) = ctx.stop_interaction {
        defer_interaction(http, interaction).await?;
        return http.delete_response(interaction).await.ignore_not_found();
    }

    match ctx.message.origin.as_ref() {
        Some(origin) if origin.token_is_valid() => {
            http.delete_response(origin).await.ignore_not_found()
        }
        _ => Ok(()),
    }
}

async fn modify_message(
    http: &dyn InteractiveHttp,
    ctx: &StopContext<'_>,
    page: Option<&Page>,
    components: Option<&[Component]>,
) -> Result<(), PlatformError> {
    if let Some(interaction) = ctx.stop_interaction {
        let response = update_response(page, components);
        return http
            .create_response(interaction, &response)
            .await
            .ignore_not_found();
    }

    let fresh_interaction = ctx
        .last_interaction
        .filter(|interaction| interaction.token_is_valid())
        .or_else(|| {
            ctx.message
                .origin
                .as_ref()
                .filter(|origin| origin.token_is_valid())
        });

    if let Some(interaction) = fresh_interaction {
        return http
            .update_response(interaction, page, components)
            .await
            .ignore_not_found();
    }

    if ctx.message.ephemeral {
        debug!(
            message_id = ctx.message.id.get(),
            "no usable token left for ephemeral message, skipping stop modification"
        );
        return Ok(());
    }

    http.update_message(ctx.message, page, components)
        .await
        .ignore_not_found()
}

async fn clear_reactions(
    http: &dyn InteractiveHttp,
    message: &MessageHandle,
) -> Result<(), PlatformError> {
    match http.can_manage_messages(message).await {
        Ok(true) => http.delete_all_reactions(message).await.ignore_not_found(),
        Ok(false) => Ok(()),
        Err(source) => {
            debug!(?source, "could not resolve permissions, leaving reactions");
            Ok(())
        }
    }
}

pub(crate) fn update_response(
    page: Option<&Page>,
    components: Option<&[Component]>,
) -> InteractionResponse {
    let mut data = InteractionResponseDataBuilder::new();
    if let Some(page) = page {
        if let Some(content) = page.content.as_deref() {
            data = data.content(content);
        }
        data = data.embeds(page.embeds.clone());
    }
    if let Some(components) = components {
        data = data.components(components.to_vec());
    }

    InteractionResponse {
        kind: InteractionResponseType::UpdateMessage,
        data: Some(data.build()),
    }
}
