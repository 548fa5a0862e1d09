use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use twilight_model::id::{Id, marker::ChannelMarker};

use super::{InteractiveCallback, answer_restricted};
use crate::error::PlatformError;
use crate::event::{IncomingInteraction, IncomingMessage, IncomingReaction, InteractionPayload};
use crate::flags::{InputStatus, InputType};
use crate::http::{InteractiveHttp, MessageHandle};
use crate::result::{Outcome, StopWitness};
use crate::selection::Selection;
use crate::stop::{StopContext, apply_stop_action};
use crate::timeout::TimeoutSource;

/// Single-shot session: the first valid choice resolves it.
pub(crate) struct SelectionCallback<T: Clone + Send + Sync + 'static> {
    selection: Selection<T>,
    witness: Mutex<StopWitness>,
    message: MessageHandle,
    source: Arc<TimeoutSource<Outcome<T>>>,
    http: Arc<dyn InteractiveHttp>,
}

impl<T> SelectionCallback<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(
        selection: Selection<T>,
        message: MessageHandle,
        source: Arc<TimeoutSource<Outcome<T>>>,
        http: Arc<dyn InteractiveHttp>,
    ) -> Self {
        Self {
            selection,
            witness: Mutex::new(StopWitness::None),
            message,
            source,
            http,
        }
    }

    /// Apply the stop policy for `outcome` and hand back the witness that ended the session.
    pub async fn finish(
        &self,
        outcome: &Outcome<T>,
        defer_unacted: bool,
    ) -> Result<StopWitness, PlatformError> {
        let status = outcome.status();
        let witness = self.witness.lock().await;

        let ctx = StopContext {
            message: &self.message,
            status,
            action: self.selection.action_on_stop(status),
            stop_page: self.selection.stop_page(status),
            disabled_components: self.selection.disabled_components(),
            input_type: self.selection.input_type(),
            stop_interaction: witness.interaction(),
            last_interaction: None,
            defer_unacted,
        };
        apply_stop_action(self.http.as_ref(), ctx).await?;

        Ok(witness.clone())
    }

    /// Resolve with the verdict for `option`. Only the first resolver records its witness.
    async fn resolve(&self, option: &T, witness: StopWitness) {
        let outcome = match self.selection.verdict(option) {
            InputStatus::Canceled => Outcome::Canceled,
            _ => Outcome::Success(option.clone()),
        };

        let mut current = self.witness.lock().await;
        if self.source.try_set_result(outcome) {
            *current = witness;
        }
    }
}

#[async_trait]
impl<T> InteractiveCallback for SelectionCallback<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn channel_id(&self) -> Id<ChannelMarker> {
        self.message.channel_id
    }

    fn input_type(&self) -> InputType {
        self.selection.input_type()
    }

    async fn execute_message(&self, message: &IncomingMessage) -> anyhow::Result<()> {
        if self.source.is_resolved()
            || !self.selection.input_type().contains(InputType::MESSAGES)
            || message.channel_id != self.message.channel_id
            || !self.selection.can_interact(message.author_id)
        {
            return Ok(());
        }

        if let Some(option) = self.selection.option_for_text(&message.content) {
            self.resolve(option, StopWitness::Message(message.clone()))
                .await;
        }

        Ok(())
    }

    async fn execute_reaction(&self, reaction: &IncomingReaction) -> anyhow::Result<()> {
        if self.source.is_resolved()
            || !self.selection.input_type().contains(InputType::REACTIONS)
            || !self.selection.can_interact(reaction.user_id)
        {
            return Ok(());
        }

        if let Some(option) = self.selection.option_for_emote(&reaction.emote) {
            self.resolve(option, StopWitness::Reaction(reaction.clone()))
                .await;
        }

        Ok(())
    }

    async fn execute_interaction(&self, interaction: &IncomingInteraction) -> anyhow::Result<()> {
        if self.source.is_resolved() || !self.selection.input_type().uses_components() {
            return Ok(());
        }
        let InteractionPayload::Component { custom_id, values } = &interaction.payload else {
            return Ok(());
        };
        let Some(option) = self.selection.option_for_component(custom_id, values) else {
            return Ok(());
        };
        let Some(user_id) = interaction.user_id else {
            return Ok(());
        };

        if !self.selection.can_interact(user_id) {
            answer_restricted(
                self.http.as_ref(),
                interaction,
                self.selection.restricted_input(),
                self.selection.restricted_page(),
            )
            .await?;
            return Ok(());
        }

        self.resolve(option, StopWitness::Interaction(interaction.clone()))
            .await;

        Ok(())
    }

    fn cancel(&self) -> bool {
        self.source.try_cancel()
    }
}
