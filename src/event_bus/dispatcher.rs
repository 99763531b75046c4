use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use futures_util::FutureExt;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use super::handler::{EventHandler, EventSubscriber};
use super::limiter::ConcurrencyLimiter;
use super::registry::Registry;
use super::types::{DispatcherState, Event, EventResult};

/// Routes dequeued events to handlers and relays results to subscribers
pub struct Dispatcher<E: Event> {
    handlers: Registry<dyn EventHandler<E>>,
    subscribers: Registry<dyn EventSubscriber<E>>,
    limiter: ConcurrencyLimiter,
    state: AtomicU8,
}

impl<E: Event> Dispatcher<E> {
    pub fn new(max_workers: usize) -> Self {
        Self {
            handlers: Registry::new(),
            subscribers: Registry::new(),
            limiter: ConcurrencyLimiter::new(max_workers),
            state: AtomicU8::new(DispatcherState::Stopped.as_u8()),
        }
    }

    pub fn handlers(&self) -> &Registry<dyn EventHandler<E>> {
        &self.handlers
    }

    pub fn subscribers(&self) -> &Registry<dyn EventSubscriber<E>> {
        &self.subscribers
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn state(&self) -> DispatcherState {
        DispatcherState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: DispatcherState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Run every handler of the event's topic, notifying subscribers after each
    ///
    /// Handlers run sequentially in registration order. The result of handler
    /// `i` reaches every subscriber before handler `i + 1` starts. Returns the
    /// number of results produced (0 when the topic has no handler).
    pub async fn handle_event(&self, event: Arc<E>) -> usize {
        let topic = event.topic();
        let handlers = self.handlers.lookup(topic).await;

        if handlers.is_empty() {
            debug!(topic = %topic, name = %event.name(), "no handlers found for event topic");
            return 0;
        }

        let mut produced = 0;
        for handler in handlers {
            let result = Self::run_handler(handler.as_ref(), event.clone()).await;
            produced += 1;

            if !result.succeeded {
                warn!(
                    topic = %topic,
                    name = %event.name(),
                    handler = handler.name(),
                    "event handling failed"
                );
            }

            self.notify_subscribers(topic, &result).await;
        }

        produced
    }

    async fn run_handler(handler: &dyn EventHandler<E>, event: Arc<E>) -> EventResult<E> {
        match AssertUnwindSafe(handler.handle(event.clone()))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(
                    topic = %event.topic(),
                    name = %event.name(),
                    handler = handler.name(),
                    "event handler panicked"
                );
                EventResult::failure(event)
            }
        }
    }

    async fn notify_subscribers(&self, topic: &str, result: &EventResult<E>) {
        let subscribers = self.subscribers.lookup(topic).await;

        if subscribers.is_empty() {
            debug!(topic = %topic, "no subscribers found for event topic");
            return;
        }

        for subscriber in subscribers {
            if AssertUnwindSafe(subscriber.notify(result))
                .catch_unwind()
                .await
                .is_err()
            {
                error!(
                    topic = %topic,
                    name = %result.name(),
                    subscriber = subscriber.name(),
                    "event subscriber panicked"
                );
            }
        }
    }

    /// Drain the queue until a stop signal arrives
    ///
    /// Waits on whichever comes first, a new event or the stop signal. Each
    /// event takes one permit before its handling task is spawned; the loop
    /// blocks while the pool is exhausted. Tasks already spawned are left to
    /// finish on their own. Returns the receiver so the queue can be drained
    /// again by a later loop.
    pub(crate) async fn run_loop(
        self: Arc<Self>,
        mut rx: mpsc::Receiver<Arc<E>>,
        mut shutdown: watch::Receiver<bool>,
    ) -> mpsc::Receiver<Arc<E>> {
        info!(
            max_workers = self.limiter.max_workers(),
            "event dispatcher started"
        );
        self.set_state(DispatcherState::Idle);

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow_and_update() {
                        info!("event dispatcher signaled to stop");
                        break;
                    }
                }

                received = rx.recv() => {
                    let Some(event) = received else {
                        info!("event queue closed, stopping dispatcher");
                        break;
                    };

                    debug!(topic = %event.topic(), name = %event.name(), "new event received");
                    self.set_state(DispatcherState::Dispatching);

                    let permit = match self.limiter.acquire().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            error!("concurrency limiter closed: {}", e);
                            break;
                        }
                    };

                    let dispatcher = self.clone();
                    tokio::spawn(async move {
                        let _permit = permit;
                        dispatcher.handle_event(event).await;
                    });

                    self.set_state(DispatcherState::Idle);
                }
            }
        }

        self.set_state(DispatcherState::Stopped);
        rx
    }
}
