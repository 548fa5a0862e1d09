//! The public façade: sends widgets, binds them to sessions and waits for them to end.

use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use twilight_model::{
    channel::message::{MessageFlags, component::Component},
    gateway::event::Event,
    http::interaction::{InteractionResponse, InteractionResponseType},
    id::{
        Id,
        marker::{ChannelMarker, MessageMarker, UserMarker},
    },
};
use twilight_util::builder::InteractionResponseDataBuilder;

use crate::callback::{
    EventAction, InteractiveCallback, PaginatorCallback, SelectionCallback, wait_for_event,
};
use crate::config::InteractiveConfig;
use crate::emote::Emote;
use crate::error::{InteractiveError, PlatformError, Result};
use crate::event::{
    IncomingInteraction, IncomingMessage, IncomingReaction, InteractiveEvent, WaitableEvent,
};
use crate::flags::InputType;
use crate::http::{InteractiveHttp, MessageHandle};
use crate::page::Page;
use crate::paginator::Paginator;
use crate::registry::SessionRegistry;
use crate::result::{InteractiveResult, InteractiveStatus, Outcome, PaginatorResult};
use crate::router;
use crate::selection::Selection;
use crate::timeout::TimeoutSource;

/// Where a widget's message is shown.
#[derive(Clone, Debug)]
pub enum MessageTarget {
    /// Send a new message to the channel.
    Channel(Id<ChannelMarker>),
    /// Replace the content of a message the bot already sent.
    Existing(MessageHandle),
    /// Respond to an interaction; the original response becomes the widget message.
    Interaction {
        interaction: IncomingInteraction,
        ephemeral: bool,
    },
}

struct ServiceInner {
    http: Arc<dyn InteractiveHttp>,
    registry: Arc<SessionRegistry>,
    config: InteractiveConfig,
    current_user: OnceLock<Id<UserMarker>>,
}

/// Cheap to clone; every clone shares the same registry.
#[derive(Clone)]
pub struct InteractiveService {
    inner: Arc<ServiceInner>,
}

/// Deregisters a session however its wait ends.
struct SessionGuard<'a> {
    registry: &'a SessionRegistry,
    message_id: Id<MessageMarker>,
    session: Arc<dyn InteractiveCallback>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.registry.remove_session_if_same(self.message_id, &self.session);
    }
}

impl InteractiveService {
    pub fn new(http: Arc<dyn InteractiveHttp>, config: InteractiveConfig) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                http,
                registry: Arc::new(SessionRegistry::default()),
                config,
                current_user: OnceLock::new(),
            }),
        }
    }

    pub fn config(&self) -> &InteractiveConfig {
        &self.inner.config
    }

    /// Events produced by this user (the bot itself) are never routed.
    pub fn set_current_user(&self, user_id: Id<UserMarker>) {
        if self.inner.current_user.set(user_id).is_err() {
            debug!(user_id = user_id.get(), "current user already set");
        }
    }

    /// Hand one event to every interested session and waiter. Never blocks on their work.
    pub fn handle_event(&self, event: InteractiveEvent) {
        if let (Some(current), Some(author)) = (self.inner.current_user.get(), event.user_id())
            && *current == author
        {
            return;
        }

        router::route(&self.inner.registry, event);
    }

    /// Feed a raw gateway event. Learns the bot's own id from `Ready`.
    pub fn handle_gateway_event(&self, event: &Event) {
        if let Event::Ready(ready) = event {
            self.set_current_user(ready.user.id);
            return;
        }

        if let Some(event) = InteractiveEvent::from_gateway(event) {
            self.handle_event(event);
        }
    }

    /// Wait for the next event of shape `E` passing `filter`.
    ///
    /// `action` runs for every event of that shape, with whether it passed the filter.
    pub async fn next_event<E: WaitableEvent>(
        &self,
        filter: impl Fn(&E) -> bool + Send + Sync + 'static,
        action: Option<EventAction<E>>,
        timeout: Option<Duration>,
        cancel: Option<CancellationToken>,
    ) -> Result<InteractiveResult<E>> {
        let timeout = self.inner.config.clamp_timeout(timeout);

        wait_for_event(
            &self.inner.registry,
            Arc::new(filter),
            action,
            timeout,
            cancel,
        )
        .await
    }

    pub async fn next_message(
        &self,
        filter: impl Fn(&IncomingMessage) -> bool + Send + Sync + 'static,
        timeout: Option<Duration>,
        cancel: Option<CancellationToken>,
    ) -> Result<InteractiveResult<IncomingMessage>> {
        self.next_event(filter, None, timeout, cancel).await
    }

    pub async fn next_reaction(
        &self,
        filter: impl Fn(&IncomingReaction) -> bool + Send + Sync + 'static,
        timeout: Option<Duration>,
        cancel: Option<CancellationToken>,
    ) -> Result<InteractiveResult<IncomingReaction>> {
        self.next_event(filter, None, timeout, cancel).await
    }

    pub async fn next_interaction(
        &self,
        filter: impl Fn(&IncomingInteraction) -> bool + Send + Sync + 'static,
        timeout: Option<Duration>,
        cancel: Option<CancellationToken>,
    ) -> Result<InteractiveResult<IncomingInteraction>> {
        self.next_event(filter, None, timeout, cancel).await
    }

    /// Show a paginator and wait until it times out or is canceled.
    ///
    /// Every accepted page change restarts the timeout.
    pub async fn send_paginator(
        &self,
        paginator: Paginator,
        target: MessageTarget,
        timeout: Option<Duration>,
        cancel: Option<CancellationToken>,
    ) -> Result<PaginatorResult> {
        ensure_not_canceled(cancel.as_ref())?;
        let timeout = self.inner.config.clamp_timeout(timeout);

        let message = self
            .show(target, &paginator.current_page(), &paginator.components())
            .await?;
        let emotes: Vec<Emote> = if paginator.input_type().contains(InputType::REACTIONS) {
            paginator
                .controls()
                .iter()
                .map(|control| control.emote.clone())
                .collect()
        } else {
            Vec::new()
        };

        let source = Arc::new(TimeoutSource::new(
            timeout,
            true,
            InteractiveStatus::Timeout,
            InteractiveStatus::Canceled,
            cancel,
        )?);
        let callback = Arc::new(PaginatorCallback::new(
            paginator,
            message.clone(),
            Arc::clone(&source),
            Arc::clone(&self.inner.http),
            Arc::downgrade(&self.inner.registry),
            self.inner.config.jump_input_timeout,
        ));

        let started = Instant::now();
        let session: Arc<dyn InteractiveCallback> = callback.clone();
        let guard = self.register(message.id, session)?;
        debug!(message_id = message.id.get(), ?timeout, "paginator session started");

        if let Err(err) = self.prime(&message, &emotes).await {
            source.dispose();
            return Err(err.into());
        }

        let status = source.wait().await;
        drop(guard);
        source.dispose();
        debug!(message_id = message.id.get(), ?status, "paginator session ended");

        let (current_page_index, witness) = callback
            .finish(status, self.inner.config.defer_stop_interactions)
            .await?;

        Ok(PaginatorResult {
            status,
            elapsed: started.elapsed(),
            witness,
            current_page_index,
            message,
        })
    }

    /// Show a selection and wait for the first valid choice, a timeout or a cancellation.
    pub async fn send_selection<T>(
        &self,
        selection: Selection<T>,
        target: MessageTarget,
        timeout: Option<Duration>,
        cancel: Option<CancellationToken>,
    ) -> Result<InteractiveResult<T>>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        ensure_not_canceled(cancel.as_ref())?;
        let timeout = self.inner.config.clamp_timeout(timeout);

        let message = self
            .show(target, selection.selection_page(), &selection.components())
            .await?;
        let emotes = if selection.input_type().contains(InputType::REACTIONS) {
            selection.emotes()
        } else {
            Vec::new()
        };

        let source = Arc::new(TimeoutSource::new(
            timeout,
            false,
            Outcome::Timeout,
            Outcome::Canceled,
            cancel,
        )?);
        let callback = Arc::new(SelectionCallback::new(
            selection,
            message.clone(),
            Arc::clone(&source),
            Arc::clone(&self.inner.http),
        ));

        let started = Instant::now();
        let session: Arc<dyn InteractiveCallback> = callback.clone();
        let guard = self.register(message.id, session)?;
        debug!(message_id = message.id.get(), ?timeout, "selection session started");

        if let Err(err) = self.prime(&message, &emotes).await {
            source.dispose();
            return Err(err.into());
        }

        let outcome = source.wait().await;
        drop(guard);
        source.dispose();
        debug!(
            message_id = message.id.get(),
            status = ?outcome.status(),
            "selection session ended"
        );

        let witness = callback
            .finish(&outcome, self.inner.config.defer_stop_interactions)
            .await?;

        Ok(InteractiveResult::new(
            outcome,
            started.elapsed(),
            witness,
            Some(message),
        ))
    }

    /// Resolve the session bound to `message_id` as canceled. Returns `false` when there is none.
    pub fn cancel_session(&self, message_id: Id<MessageMarker>) -> bool {
        self.inner
            .registry
            .session(message_id)
            .is_some_and(|session| session.cancel())
    }

    /// Stop routing events to the session bound to `message_id` without resolving it.
    pub fn try_remove_session(&self, message_id: Id<MessageMarker>) -> bool {
        self.inner.registry.try_remove_session(message_id)
    }

    pub fn active_session_count(&self) -> usize {
        self.inner.registry.session_count()
    }

    pub fn pending_waiter_count(&self) -> usize {
        self.inner.registry.waiter_count()
    }

    /// Register `callback` for `message_id`, failing when the message already has a session.
    fn register(
        &self,
        message_id: Id<MessageMarker>,
        callback: Arc<dyn InteractiveCallback>,
    ) -> Result<SessionGuard<'_>> {
        if !self.inner.registry.insert_session(message_id, Arc::clone(&callback)) {
            return Err(InteractiveError::SessionExists(message_id.get()));
        }

        Ok(SessionGuard {
            registry: &self.inner.registry,
            message_id,
            session: callback,
        })
    }

    /// Add reaction controls in order. Runs after registration so early reactions are seen.
    async fn prime(&self, message: &MessageHandle, emotes: &[Emote]) -> Result<(), PlatformError> {
        for emote in emotes {
            self.inner.http.create_reaction(message, emote).await?;
        }

        Ok(())
    }

    /// Put the widget's first render on screen and return the message it lives in.
    async fn show(
        &self,
        target: MessageTarget,
        page: &Page,
        components: &[Component],
    ) -> Result<MessageHandle, PlatformError> {
        let http = self.inner.http.as_ref();

        match target {
            MessageTarget::Channel(channel_id) => {
                http.create_message(channel_id, page, components).await
            }
            MessageTarget::Existing(message) => {
                match message.origin.as_ref().filter(|origin| origin.token_is_valid()) {
                    Some(origin) => {
                        http.update_response(origin, Some(page), Some(components))
                            .await?
                    }
                    None => {
                        http.update_message(&message, Some(page), Some(components))
                            .await?
                    }
                }
                Ok(message)
            }
            MessageTarget::Interaction {
                interaction,
                ephemeral,
            } => {
                let mut data = InteractionResponseDataBuilder::new()
                    .embeds(page.embeds.clone())
                    .components(components.to_vec());
                if let Some(content) = page.content.as_deref() {
                    data = data.content(content);
                }
                if ephemeral {
                    data = data.flags(MessageFlags::EPHEMERAL);
                }
                let response = InteractionResponse {
                    kind: InteractionResponseType::ChannelMessageWithSource,
                    data: Some(data.build()),
                };

                http.create_response(&interaction, &response).await?;
                let mut message = http.response_message(&interaction).await?;
                message.ephemeral |= ephemeral;
                Ok(message)
            }
        }
    }
}

fn ensure_not_canceled(cancel: Option<&CancellationToken>) -> Result<()> {
    if cancel.is_some_and(CancellationToken::is_cancelled) {
        return Err(InteractiveError::AlreadyCanceled);
    }

    Ok(())
}
