use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::event::{EventKind, InteractiveEvent, WaitableEvent};
use crate::registry::SessionRegistry;
use crate::result::{InteractiveResult, Outcome, StopWitness};
use crate::timeout::TimeoutSource;

pub type EventFilter<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Side effect run for every event of the waited shape, with whether the filter passed.
pub type EventAction<E> =
    Arc<dyn Fn(E, bool) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// An ad-hoc waiter registered under a request id.
#[async_trait]
pub(crate) trait FilteredDispatch: Send + Sync {
    fn kind(&self) -> EventKind;

    async fn dispatch(&self, event: &InteractiveEvent) -> anyhow::Result<()>;
}

struct FilteredCallback<E> {
    filter: EventFilter<E>,
    action: Option<EventAction<E>>,
    source: Arc<TimeoutSource<Outcome<E>>>,
}

#[async_trait]
impl<E: WaitableEvent> FilteredDispatch for FilteredCallback<E> {
    fn kind(&self) -> EventKind {
        E::KIND
    }

    async fn dispatch(&self, event: &InteractiveEvent) -> anyhow::Result<()> {
        let Some(event) = E::from_event(event) else {
            return Ok(());
        };
        if self.source.is_resolved() {
            return Ok(());
        }

        let passed = (self.filter)(&event);
        if let Some(action) = &self.action {
            action(event.clone(), passed).await?;
        }

        if passed {
            self.source.try_set_result(Outcome::Success(event));
        }

        Ok(())
    }
}

/// Removes a waiter from the registry however its wait ends.
struct WaiterGuard<'a> {
    registry: &'a SessionRegistry,
    id: Uuid,
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        self.registry.try_remove_waiter(&self.id);
    }
}

/// Wait for the next event of shape `E` that passes `filter`.
pub(crate) async fn wait_for_event<E: WaitableEvent>(
    registry: &SessionRegistry,
    filter: EventFilter<E>,
    action: Option<EventAction<E>>,
    timeout: Duration,
    cancel: Option<CancellationToken>,
) -> Result<InteractiveResult<E>> {
    let source = Arc::new(TimeoutSource::new(
        timeout,
        false,
        Outcome::Timeout,
        Outcome::Canceled,
        cancel,
    )?);
    let started = Instant::now();

    let id = Uuid::new_v4();
    let callback = FilteredCallback {
        filter,
        action,
        source: Arc::clone(&source),
    };
    registry.insert_waiter(id, Arc::new(callback));
    let guard = WaiterGuard { registry, id };
    debug!(%id, kind = ?E::KIND, ?timeout, "waiting for event");

    let outcome = source.wait().await;
    drop(guard);
    source.dispose();

    let witness = outcome
        .value()
        .cloned()
        .map_or(StopWitness::None, WaitableEvent::into_witness);

    Ok(InteractiveResult::new(
        outcome,
        started.elapsed(),
        witness,
        None,
    ))
}
