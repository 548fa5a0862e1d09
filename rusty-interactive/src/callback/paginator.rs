use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use twilight_model::id::{Id, marker::ChannelMarker};

use rusty_utils::parse::parse_page_index;

use super::{InteractiveCallback, answer_restricted, defer_interaction, wait_for_event};
use crate::components::{JUMP_MODAL_CUSTOM_ID, JUMP_MODAL_FIELD_ID, jump_modal_response};
use crate::error::{InteractiveError, PlatformError};
use crate::event::{IncomingInteraction, IncomingMessage, IncomingReaction, InteractionPayload};
use crate::flags::{InputStatus, InputType};
use crate::http::{InteractiveHttp, MessageHandle};
use crate::paginator::{Paginator, PaginatorAction};
use crate::registry::SessionRegistry;
use crate::result::{InteractiveStatus, StopWitness};
use crate::stop::{StopContext, apply_stop_action, update_response};
use crate::timeout::TimeoutSource;

#[derive(Default)]
struct SessionState {
    witness: StopWitness,
    /// Last interaction answered with a page update; its token may still edit the message.
    last_interaction: Option<IncomingInteraction>,
}

/// Multi-shot session: page changes rearm the timer, only timeout or cancellation end it.
pub(crate) struct PaginatorCallback {
    paginator: Mutex<Paginator>,
    state: Mutex<SessionState>,
    message: MessageHandle,
    input_type: InputType,
    source: Arc<TimeoutSource<InteractiveStatus>>,
    http: Arc<dyn InteractiveHttp>,
    registry: Weak<SessionRegistry>,
    jump_input_timeout: Duration,
    stopped: CancellationToken,
}

impl PaginatorCallback {
    pub fn new(
        paginator: Paginator,
        message: MessageHandle,
        source: Arc<TimeoutSource<InteractiveStatus>>,
        http: Arc<dyn InteractiveHttp>,
        registry: Weak<SessionRegistry>,
        default_jump_timeout: Duration,
    ) -> Self {
        Self {
            input_type: paginator.input_type(),
            jump_input_timeout: paginator
                .jump_input_timeout()
                .unwrap_or(default_jump_timeout),
            paginator: Mutex::new(paginator),
            state: Mutex::new(SessionState::default()),
            message,
            source,
            http,
            registry,
            stopped: CancellationToken::new(),
        }
    }

    /// Mark the widget stopped, apply its stop policy and report the final page and witness.
    pub async fn finish(
        &self,
        status: InteractiveStatus,
        defer_unacted: bool,
    ) -> Result<(usize, StopWitness), PlatformError> {
        self.stopped.cancel();

        let mut paginator = self.paginator.lock().await;
        paginator.mark_stopped(status);
        let state = self.state.lock().await;

        let ctx = StopContext {
            message: &self.message,
            status,
            action: paginator.action_on_stop(status),
            stop_page: paginator.stop_page(status),
            disabled_components: paginator.disabled_components(),
            input_type: self.input_type,
            stop_interaction: state.witness.interaction(),
            last_interaction: state.last_interaction.as_ref(),
            defer_unacted,
        };
        apply_stop_action(self.http.as_ref(), ctx).await?;

        Ok((paginator.current_page_index(), state.witness.clone()))
    }

    async fn stop(&self, witness: StopWitness) {
        let mut state = self.state.lock().await;
        if self.source.try_cancel() {
            state.witness = witness;
        }
    }

    /// Edit the message in place after a reaction-driven page change.
    async fn refresh(&self, paginator: &Paginator) -> Result<(), PlatformError> {
        let page = paginator.current_page();
        let components = paginator.components();
        let components = self
            .input_type
            .contains(InputType::BUTTONS)
            .then_some(components.as_slice());

        self.http
            .update_message(&self.message, Some(&page), components)
            .await?;
        self.source.try_reset();

        Ok(())
    }

    /// Answer a button or modal interaction with the current page.
    async fn show_page(
        &self,
        paginator: &Paginator,
        interaction: &IncomingInteraction,
    ) -> Result<(), PlatformError> {
        let page = paginator.current_page();
        let components = paginator.components();
        let response = update_response(Some(&page), Some(&components));

        self.http.create_response(interaction, &response).await?;
        self.state.lock().await.last_interaction = Some(interaction.clone());
        self.source.try_reset();

        Ok(())
    }

    /// Wait for the reacting user to type a page number in the same channel.
    async fn jump_from_message(&self, reaction: &IncomingReaction) -> anyhow::Result<()> {
        let Some(registry) = self.registry.upgrade() else {
            return Ok(());
        };

        let (page_count, delete_input) = {
            let paginator = self.paginator.lock().await;
            (paginator.page_count(), paginator.delete_jump_input())
        };
        let channel_id = self.message.channel_id;
        let user_id = reaction.user_id;
        let filter = move |message: &IncomingMessage| {
            message.channel_id == channel_id
                && message.author_id == user_id
                && parse_page_index(&message.content, page_count).is_some()
        };

        let result = match wait_for_event::<IncomingMessage>(
            &registry,
            Arc::new(filter),
            None,
            self.jump_input_timeout,
            Some(self.stopped.child_token()),
        )
        .await
        {
            Ok(result) => result,
            Err(InteractiveError::AlreadyCanceled) => return Ok(()),
            Err(source) => return Err(source.into()),
        };

        let Some(input) = result.into_value() else {
            return Ok(());
        };

        if delete_input
            && let Err(source) = self
                .http
                .delete_user_message(input.channel_id, input.id)
                .await
        {
            debug!(?source, "could not delete jump input message");
        }

        let mut paginator = self.paginator.lock().await;
        if self.source.is_resolved() {
            return Ok(());
        }
        if let Some(index) = parse_page_index(&input.content, page_count)
            && paginator.set_page(index)
        {
            self.refresh(&paginator).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl InteractiveCallback for PaginatorCallback {
    fn channel_id(&self) -> Id<ChannelMarker> {
        self.message.channel_id
    }

    fn input_type(&self) -> InputType {
        self.input_type
    }

    async fn execute_reaction(&self, reaction: &IncomingReaction) -> anyhow::Result<()> {
        if self.source.is_resolved() || !self.input_type.contains(InputType::REACTIONS) {
            return Ok(());
        }

        let action = {
            let paginator = self.paginator.lock().await;
            let Some(action) = paginator.action_for_emote(&reaction.emote) else {
                return Ok(());
            };
            if !paginator.can_interact(reaction.user_id) {
                return Ok(());
            }
            action
        };

        if let Err(source) = self
            .http
            .delete_reaction(&self.message, &reaction.emote, reaction.user_id)
            .await
        {
            debug!(?source, "could not remove paginator reaction");
        }

        match action {
            PaginatorAction::Exit => {
                self.stop(StopWitness::Reaction(reaction.clone())).await;
            }
            PaginatorAction::Jump => self.jump_from_message(reaction).await?,
            action => {
                let mut paginator = self.paginator.lock().await;
                if !self.source.is_resolved() && paginator.apply(action) == InputStatus::Success {
                    self.refresh(&paginator).await?;
                }
            }
        }

        Ok(())
    }

    async fn execute_interaction(&self, interaction: &IncomingInteraction) -> anyhow::Result<()> {
        if self.source.is_resolved() || !self.input_type.contains(InputType::BUTTONS) {
            return Ok(());
        }
        let Some(user_id) = interaction.user_id else {
            return Ok(());
        };

        let mut paginator = self.paginator.lock().await;

        let action = match &interaction.payload {
            InteractionPayload::Component { custom_id, .. } => {
                match paginator.action_for_custom_id(custom_id) {
                    Some(action) => Some(action),
                    None => return Ok(()),
                }
            }
            InteractionPayload::Modal { custom_id, .. } if custom_id == JUMP_MODAL_CUSTOM_ID => {
                None
            }
            InteractionPayload::Modal { .. } => return Ok(()),
        };

        if !paginator.can_interact(user_id) {
            answer_restricted(
                self.http.as_ref(),
                interaction,
                paginator.restricted_input(),
                paginator.restricted_page(),
            )
            .await?;
            return Ok(());
        }

        match action {
            None => {
                let target = interaction
                    .modal_field(JUMP_MODAL_FIELD_ID)
                    .and_then(|raw| parse_page_index(raw, paginator.page_count()));
                match target {
                    Some(index) if paginator.set_page(index) => {
                        self.show_page(&paginator, interaction).await?;
                    }
                    _ => defer_interaction(self.http.as_ref(), interaction).await?,
                }
            }
            Some(PaginatorAction::Exit) => {
                self.stop(StopWitness::Interaction(interaction.clone()))
                    .await;
            }
            Some(PaginatorAction::Jump) => {
                self.http
                    .create_response(interaction, &jump_modal_response(paginator.page_count()))
                    .await?;
            }
            Some(action) => match paginator.apply(action) {
                InputStatus::Success => self.show_page(&paginator, interaction).await?,
                _ => defer_interaction(self.http.as_ref(), interaction).await?,
            },
        }

        Ok(())
    }

    fn cancel(&self) -> bool {
        self.source.try_cancel()
    }
}
