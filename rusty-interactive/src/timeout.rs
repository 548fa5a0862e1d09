//! Single-assignment future with a resettable deadline and an external cancellation hook.
//!
//! Three triggers race to resolve a [`TimeoutSource`]: an explicit
//! [`TimeoutSource::try_set_result`], the background timer, and the caller's
//! [`CancellationToken`]. The first one wins and the others become no-ops.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tokio_util::sync::CancellationToken;

use crate::error::{InteractiveError, Result};

struct Shared<R> {
    slot: watch::Sender<Option<R>>,
    timeout_value: R,
    cancel_value: R,
}

impl<R: Clone> Shared<R> {
    fn try_set(&self, value: R) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(value);
            true
        })
    }
}

pub struct TimeoutSource<R> {
    shared: Arc<Shared<R>>,
    delay: Duration,
    resettable: bool,
    deadline: watch::Sender<Instant>,
    timer: JoinHandle<()>,
    disposed: AtomicBool,
}

impl<R> TimeoutSource<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Start a source whose timer fires `delay` from now.
    ///
    /// Fails with [`InteractiveError::AlreadyCanceled`] when `cancel` is already triggered.
    /// Must be called from within a Tokio runtime.
    pub fn new(
        delay: Duration,
        resettable: bool,
        timeout_value: R,
        cancel_value: R,
        cancel: Option<CancellationToken>,
    ) -> Result<Self> {
        if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(InteractiveError::AlreadyCanceled);
        }

        let (slot, _) = watch::channel(None);
        let shared = Arc::new(Shared {
            slot,
            timeout_value,
            cancel_value,
        });

        let (deadline, deadline_rx) = watch::channel(Instant::now() + delay);
        let timer = tokio::spawn(run_timer(
            Arc::clone(&shared),
            deadline_rx,
            cancel.unwrap_or_default(),
        ));

        Ok(Self {
            shared,
            delay,
            resettable,
            deadline,
            timer,
            disposed: AtomicBool::new(false),
        })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_resettable(&self) -> bool {
        self.resettable
    }

    /// Rearm the timer to fire `delay` from now.
    ///
    /// Returns `false` when the source is not resettable, already resolved or disposed.
    pub fn try_reset(&self) -> bool {
        if !self.resettable || self.disposed.load(Ordering::Acquire) || self.is_resolved() {
            return false;
        }

        self.deadline.send_replace(Instant::now() + self.delay);
        true
    }

    /// Attempt the single assignment. Returns `false` when already resolved.
    pub fn try_set_result(&self, value: R) -> bool {
        self.shared.try_set(value)
    }

    /// Resolve with the cancel value. Returns `false` when already resolved.
    pub fn try_cancel(&self) -> bool {
        self.shared.try_set(self.shared.cancel_value.clone())
    }

    pub fn is_resolved(&self) -> bool {
        self.shared.slot.borrow().is_some()
    }

    /// The resolved value, if any.
    pub fn result(&self) -> Option<R> {
        self.shared.slot.borrow().clone()
    }

    /// Wait until the source resolves and return the winning value.
    pub async fn wait(&self) -> R {
        let mut slot = self.shared.slot.subscribe();
        let resolved = slot
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|value| (*value).clone());

        resolved.unwrap_or_else(|| self.shared.cancel_value.clone())
    }

    /// Stop the timer and resolve with the cancel value if still pending. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.timer.abort();
        self.try_cancel();
    }
}

impl<R> Drop for TimeoutSource<R> {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

async fn run_timer<R: Clone>(
    shared: Arc<Shared<R>>,
    mut deadline: watch::Receiver<Instant>,
    cancel: CancellationToken,
) {
    loop {
        let current = *deadline.borrow_and_update();

        tokio::select! {
            () = sleep_until(current) => {
                // A reset that raced with the sleep moves the deadline forward.
                if *deadline.borrow() > current {
                    continue;
                }
                shared.try_set(shared.timeout_value.clone());
                return;
            }
            changed = deadline.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            () = cancel.cancelled() => {
                shared.try_set(shared.cancel_value.clone());
                return;
            }
        }
    }
}
